mod support;

use std::collections::HashSet;

use chrono::{Datelike, Utc};
use invoicedash_client::commands::dashboard::{
    self, CashOutflowFilter, InvoiceFilter, cash_outflow_forecast,
};
use invoicedash_client::contracts::envelope::failure_from_error;
use serde_json::{Value, json};
use support::invoice_testkit::{ingest_records, record, single_string, temp_home};

fn data(result: invoicedash_client::ClientResult<invoicedash_client::SuccessEnvelope>) -> Value {
    assert!(result.is_ok());
    result.map(|envelope| envelope.data).unwrap_or(Value::Null)
}

fn rows(value: &Value) -> Vec<Value> {
    value.as_array().cloned().unwrap_or_default()
}

#[test]
fn acme_invoice_shows_up_in_trends_categories_and_outflow() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let acme = record("doc-acme")
            .vendor("Acme Corp", "")
            .invoice("INV-1", "2024-03-15")
            .total(1200.50, "EUR")
            .payment("2024-04-14", "pending")
            .line_items(&[(Some("Office Supplies"), 200.0)])
            .build();
        ingest_records(&home, &[acme]);

        let trends = data(dashboard::trends(Some(&home)));
        assert_eq!(
            rows(&trends),
            vec![json!({ "month": "2024-03", "count": 1, "value": 1200.5 })]
        );

        let categories = data(dashboard::categories(Some(&home)));
        assert_eq!(
            rows(&categories),
            vec![json!({ "category": "Office Supplies", "spend": 200.0 })]
        );

        let outflow = data(cash_outflow_forecast(&CashOutflowFilter::default(), Some(&home)));
        assert_eq!(
            rows(&outflow),
            vec![json!({ "date": "2024-04-14", "amount": 1200.5 })]
        );

        let vendors = data(dashboard::vendors_top(Some(&home)));
        assert_eq!(vendors[0]["vendorName"], json!("Acme Corp"));
        assert_eq!(vendors[0]["totalSpend"], json!(1200.5));
    }
}

#[test]
fn invoice_categories_are_used_only_without_line_item_categories() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1")
                    .invoice_with_category("INV-1", "Travel")
                    .total(300.0, "EUR")
                    .build(),
                record("doc-2").invoice("INV-2", "2024-05-01").total(50.0, "EUR").build(),
                record("doc-3").invoice("INV-3", "2024-05-02").build(),
            ],
        );

        let fallback = data(dashboard::categories(Some(&home)));
        assert_eq!(
            rows(&fallback),
            vec![
                json!({ "category": "Travel", "spend": 300.0 }),
                json!({ "category": "Uncategorized", "spend": 50.0 }),
            ]
        );

        ingest_records(
            &home,
            &[record("doc-4")
                .invoice("INV-4", "2024-05-03")
                .line_items(&[(Some("Software"), 80.0), (None, 20.0)])
                .build()],
        );
        let primary = data(dashboard::categories(Some(&home)));
        assert_eq!(
            rows(&primary),
            vec![json!({ "category": "Software", "spend": 80.0 })]
        );
    }
}

#[test]
fn top_vendors_rank_by_spend_and_cap_at_ten() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let records = (1..=12)
            .map(|index| {
                record(&format!("doc-{index}"))
                    .vendor(&format!("Vendor {index:02}"), "")
                    .invoice(&format!("INV-{index}"), "2024-02-01")
                    .total(f64::from(index) * 10.0, "EUR")
                    .build()
            })
            .collect::<Vec<Value>>();
        ingest_records(&home, &records);

        let vendors = rows(&data(dashboard::vendors_top(Some(&home))));
        assert_eq!(vendors.len(), 10);
        assert_eq!(vendors[0]["vendorName"], json!("Vendor 12"));
        assert_eq!(vendors[9]["vendorName"], json!("Vendor 03"));
        let spends = vendors
            .iter()
            .filter_map(|vendor| vendor["totalSpend"].as_f64())
            .collect::<Vec<f64>>();
        assert!(spends.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}

#[test]
fn stats_cover_the_current_year_only() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let year = Utc::now().year();
        ingest_records(
            &home,
            &[
                record("doc-this-year-1")
                    .invoice("INV-1", &format!("{year}-01-10"))
                    .total(100.0, "EUR")
                    .build(),
                record("doc-this-year-2")
                    .invoice("INV-2", &format!("{year}-02-10"))
                    .total(300.0, "EUR")
                    .build(),
                record("doc-last-year")
                    .invoice("INV-3", &format!("{}-12-31", year - 1))
                    .total(999.0, "EUR")
                    .created_at(&format!("{}-12-31T10:00:00Z", year - 1))
                    .build(),
            ],
        );

        let stats = data(dashboard::stats(Some(&home)));
        assert_eq!(stats["totalSpend"], json!(400.0));
        assert_eq!(stats["totalInvoices"], json!(2));
        assert_eq!(stats["averageInvoiceValue"], json!(200.0));
        assert_eq!(stats["documentsUploaded"], json!(2));
    }
}

#[test]
fn cash_outflow_groups_by_due_day_within_bounds() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").invoice("INV-1", "2024-03-01").total(100.0, "EUR").payment("2024-04-01", "pending").build(),
                record("doc-2").invoice("INV-2", "2024-03-02").total(50.0, "EUR").payment("2024-04-01", "paid").build(),
                record("doc-3").invoice("INV-3", "2024-03-03").total(25.0, "EUR").payment("2024-04-20", "pending").build(),
                record("doc-4").invoice("INV-4", "2024-03-04").total(75.0, "EUR").build(),
            ],
        );

        let all = data(cash_outflow_forecast(&CashOutflowFilter::default(), Some(&home)));
        assert_eq!(
            rows(&all),
            vec![
                json!({ "date": "2024-04-01", "amount": 150.0 }),
                json!({ "date": "2024-04-20", "amount": 25.0 }),
            ]
        );

        let bounded = data(cash_outflow_forecast(
            &CashOutflowFilter {
                start_date: Some("2024-04-02".to_string()),
                end_date: Some("2024-04-20".to_string()),
            },
            Some(&home),
        ));
        assert_eq!(
            rows(&bounded),
            vec![json!({ "date": "2024-04-20", "amount": 25.0 })]
        );
    }
}

#[test]
fn invoice_search_matches_vendor_names_case_insensitively() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").vendor("Acme Corp", "").invoice("INV-1", "2024-01-01").build(),
                record("doc-2").vendor("Globex", "").invoice("INV-2", "2024-01-02").build(),
            ],
        );

        let found = data(dashboard::invoices(
            &InvoiceFilter {
                search: Some("acme".to_string()),
                ..InvoiceFilter::default()
            },
            Some(&home),
        ));
        let listed = rows(&found["data"]);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["vendor"], json!("Acme Corp"));
        assert_eq!(listed[0]["invoiceNumber"], json!("INV-1"));
        assert_eq!(found["pagination"]["total"], json!(1));
    }
}

#[test]
fn invoice_search_folds_non_ascii_case() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").vendor("Müller GmbH", "").invoice("INV-1", "2024-01-01").build(),
                record("doc-2").vendor("Globex", "").invoice("INV-2", "2024-01-02").build(),
                record("doc-3").vendor("50% Off Ltd", "").invoice("INV-3", "2024-01-03").build(),
            ],
        );

        let search = |needle: &str| {
            data(dashboard::invoices(
                &InvoiceFilter {
                    search: Some(needle.to_string()),
                    ..InvoiceFilter::default()
                },
                Some(&home),
            ))
        };

        let umlaut = search("MÜLLER");
        assert_eq!(umlaut["pagination"]["total"], json!(1));
        assert_eq!(rows(&umlaut["data"])[0]["vendor"], json!("Müller GmbH"));

        let literal = search("50%");
        assert_eq!(literal["pagination"]["total"], json!(1));
        assert_eq!(rows(&literal["data"])[0]["invoiceNumber"], json!("INV-3"));
        assert_eq!(search("_")["pagination"]["total"], json!(0));
    }
}

fn filtered(home: &std::path::Path, filter: InvoiceFilter) -> Vec<String> {
    let listed = data(dashboard::invoices(&filter, Some(home)));
    let numbers = rows(&listed["data"])
        .iter()
        .filter_map(|row| row["invoiceNumber"].as_str().map(str::to_string))
        .collect::<Vec<String>>();
    assert_eq!(listed["pagination"]["total"], json!(numbers.len()));
    numbers
}

#[test]
fn invoice_filters_narrow_the_listing_and_combine() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").vendor("Acme Corp", "").invoice("INV-1", "2024-01-10").payment("2024-02-10", "paid").build(),
                record("doc-2").vendor("Acme Corp", "").invoice("INV-2", "2024-02-15").payment("2024-03-15", "pending").build(),
                record("doc-3").vendor("Globex", "").invoice("INV-3", "2024-02-20").payment("2024-03-20", "paid").build(),
                record("doc-4").vendor("Globex", "").invoice("INV-4", "2024-03-05").build(),
            ],
        );
        let globex = single_string(&home, "SELECT id FROM vendors WHERE name = 'Globex'");
        assert!(globex.is_some());

        assert_eq!(
            filtered(
                &home,
                InvoiceFilter {
                    vendor_id: globex.clone(),
                    ..InvoiceFilter::default()
                }
            ),
            vec!["INV-4", "INV-3"]
        );
        assert_eq!(
            filtered(
                &home,
                InvoiceFilter {
                    status: Some("paid".to_string()),
                    ..InvoiceFilter::default()
                }
            ),
            vec!["INV-3", "INV-1"]
        );
        assert_eq!(
            filtered(
                &home,
                InvoiceFilter {
                    start_date: Some("2024-02-01".to_string()),
                    end_date: Some("2024-02-20".to_string()),
                    ..InvoiceFilter::default()
                }
            ),
            vec!["INV-3", "INV-2"]
        );
        assert_eq!(
            filtered(
                &home,
                InvoiceFilter {
                    vendor_id: globex,
                    status: Some("paid".to_string()),
                    start_date: Some("2024-02-01".to_string()),
                    ..InvoiceFilter::default()
                }
            ),
            vec!["INV-3"]
        );
        assert_eq!(
            filtered(
                &home,
                InvoiceFilter {
                    status: Some("overdue".to_string()),
                    ..InvoiceFilter::default()
                }
            ),
            Vec::<String>::new()
        );
    }
}

#[test]
fn top_vendor_ties_keep_first_seen_order() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").vendor("Zeta Supplies", "").invoice("INV-1", "2024-01-01").total(100.0, "EUR").build(),
                record("doc-2").vendor("Alpha Trading", "").invoice("INV-2", "2024-01-02").total(100.0, "EUR").build(),
                record("doc-3").vendor("Mid Corp", "").invoice("INV-3", "2024-01-03").total(150.0, "EUR").build(),
            ],
        );

        let names = rows(&data(dashboard::vendors_top(Some(&home))))
            .iter()
            .filter_map(|vendor| vendor["vendorName"].as_str().map(str::to_string))
            .collect::<Vec<String>>();
        assert_eq!(names, vec!["Mid Corp", "Zeta Supplies", "Alpha Trading"]);
    }
}

#[test]
fn huge_page_limit_reports_one_page() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_records(
            &home,
            &[
                record("doc-1").invoice("INV-1", "2024-01-01").build(),
                record("doc-2").invoice("INV-2", "2024-01-02").build(),
            ],
        );

        let listed = data(dashboard::invoices(
            &InvoiceFilter {
                limit: Some(i64::MAX),
                ..InvoiceFilter::default()
            },
            Some(&home),
        ));
        assert_eq!(listed["pagination"]["total"], json!(2));
        assert_eq!(listed["pagination"]["totalPages"], json!(1));
        assert_eq!(rows(&listed["data"]).len(), 2);

        let far_page = data(dashboard::invoices(
            &InvoiceFilter {
                page: Some(i64::MAX),
                limit: Some(i64::MAX),
                ..InvoiceFilter::default()
            },
            Some(&home),
        ));
        assert_eq!(rows(&far_page["data"]).len(), 0);
        assert_eq!(far_page["pagination"]["totalPages"], json!(1));
    }
}

#[test]
fn invoice_pages_partition_the_filtered_set() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let records = (1..=7)
            .map(|index| {
                let builder = record(&format!("doc-{index}"));
                if index == 7 {
                    builder.total(5.0, "EUR").build()
                } else {
                    builder
                        .invoice(&format!("INV-{index}"), &format!("2024-01-{index:02}"))
                        .build()
                }
            })
            .collect::<Vec<Value>>();
        ingest_records(&home, &records);

        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for page in 1..=3 {
            let page_data = data(dashboard::invoices(
                &InvoiceFilter {
                    page: Some(page),
                    limit: Some(3),
                    ..InvoiceFilter::default()
                },
                Some(&home),
            ));
            assert_eq!(page_data["pagination"]["total"], json!(7));
            assert_eq!(page_data["pagination"]["totalPages"], json!(3));
            for row in rows(&page_data["data"]) {
                assert!(seen.insert(row["id"].to_string()));
                ordered.push(row);
            }
        }

        assert_eq!(ordered.len(), 7);
        assert_eq!(ordered[0]["invoiceNumber"], json!("INV-6"));
        assert_eq!(ordered[6]["invoiceDate"], Value::Null);
        assert_eq!(ordered[6]["status"], json!("pending"));
    }
}

#[test]
fn empty_store_yields_empty_results() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        assert_eq!(rows(&data(dashboard::trends(Some(&home)))), Vec::<Value>::new());
        assert_eq!(rows(&data(dashboard::vendors_top(Some(&home)))), Vec::<Value>::new());
        assert_eq!(rows(&data(dashboard::categories(Some(&home)))), Vec::<Value>::new());

        let stats = data(dashboard::stats(Some(&home)));
        assert_eq!(stats["totalSpend"], json!(0.0));
        assert_eq!(stats["averageInvoiceValue"], json!(0.0));

        let invoices = data(dashboard::invoices(&InvoiceFilter::default(), Some(&home)));
        assert_eq!(
            invoices["pagination"],
            json!({ "page": 1, "limit": 50, "total": 0, "totalPages": 0 })
        );
    }
}

#[test]
fn unreadable_store_reports_the_endpoint_message() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((dir, _home)) = temp {
        let blocker = dir.path().join("not-a-directory");
        assert!(std::fs::write(&blocker, "file").is_ok());
        let result = dashboard::trends(Some(&blocker));
        assert!(result.is_err());
        if let Err(error) = result {
            let failure = failure_from_error(&error);
            assert_eq!(failure.error.code, "aggregation_failed");
            assert_eq!(failure.error.message, "Failed to fetch invoice trends");
        }
    }
}

#[test]
fn malformed_arguments_are_user_errors_raised_before_the_store_opens() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let invoices = dashboard::invoices(
            &InvoiceFilter {
                end_date: Some("next tuesday".to_string()),
                ..InvoiceFilter::default()
            },
            Some(&home),
        );
        assert!(invoices.is_err());
        if let Err(error) = invoices {
            assert_eq!(error.code, "invalid_argument");
            assert!(!error.is_internal());
            assert!(error.message.contains("--to"));
            assert!(error.message.contains("next tuesday"));
        }

        let outflow = cash_outflow_forecast(
            &CashOutflowFilter {
                start_date: Some("2024-13-45".to_string()),
                end_date: None,
            },
            Some(&home),
        );
        assert!(outflow.is_err());
        if let Err(error) = outflow {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("--from"));
        }

        assert!(!home.exists());
    }
}

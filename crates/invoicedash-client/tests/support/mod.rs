#![allow(dead_code)]

pub mod invoice_testkit;

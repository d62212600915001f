pub mod envelope;
pub mod fields;
pub mod line_items;

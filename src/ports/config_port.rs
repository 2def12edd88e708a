//! Configuration access port trait.

use rust_decimal::Decimal;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_decimal(&self, section: &str, key: &str) -> Option<Decimal>;
    /// All keys in a section, sorted; empty when the section is absent.
    fn keys(&self, section: &str) -> Vec<String>;
}

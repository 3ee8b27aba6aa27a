//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Section names, sorted.
    fn sections(&self) -> Vec<String>;
    /// Key names within `section`, sorted; empty when the section is absent.
    fn keys(&self, section: &str) -> Vec<String>;
}

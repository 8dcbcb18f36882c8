include!(concat!(env!("OUT_DIR"), "/registry_generated.rs"));

impl Operator {
    /// Text following the colon, e.g. `>=` in `count:>=5`
    #[must_use]
    pub fn token(self) -> &'static str {
        operator_syntax(self).token
    }

    #[must_use]
    pub fn spelling(self) -> &'static str {
        operator_syntax(self).spelling
    }

    #[must_use]
    pub fn is_relational(self) -> bool {
        operator_syntax(self).relational
    }

    /// Helper description with the tag name filled in.
    #[must_use]
    pub fn describe(self, tag: &str) -> String {
        operator_syntax(self).description.replace("{tag}", tag)
    }
}

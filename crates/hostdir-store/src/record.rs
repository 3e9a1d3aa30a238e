//! A single host record.

/// One row of the store: host identifier, freshness timestamp, aliases.
///
/// A record always carries at least the host and timestamp fields. Rows with
/// fewer fields cannot be constructed, which is how both the load path and the
/// save path drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Minimum number of fields a persisted row needs.
    pub const MIN_FIELDS: usize = 2;

    const HOST: usize = 0;
    const TIMESTAMP: usize = 1;

    /// A fresh record with no aliases.
    pub fn new(host: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            fields: vec![host.into(), timestamp.into()],
        }
    }

    /// Build a record from raw fields. Returns `None` for short rows.
    pub fn from_fields(fields: Vec<String>) -> Option<Self> {
        (fields.len() >= Self::MIN_FIELDS).then_some(Self { fields })
    }

    pub fn host(&self) -> &str {
        &self.fields[Self::HOST]
    }

    pub fn timestamp(&self) -> &str {
        &self.fields[Self::TIMESTAMP]
    }

    pub fn aliases(&self) -> &[String] {
        &self.fields[Self::MIN_FIELDS..]
    }

    /// All fields in on-disk order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `key` equals any field, host and timestamp included.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field == key)
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: &str) {
        self.fields[Self::TIMESTAMP] = timestamp.to_string();
    }

    pub(crate) fn push_alias(&mut self, alias: String) {
        self.fields.push(alias);
    }
}

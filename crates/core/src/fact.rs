use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactType {
    #[serde(rename = "TYPE_A")]
    TypeA,
    #[serde(rename = "TYPE_B")]
    TypeB,
}

impl FactType {
    pub const ALL: [FactType; 2] = [FactType::TypeA, FactType::TypeB];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactType::TypeA => "TYPE_A",
            FactType::TypeB => "TYPE_B",
        }
    }
}

impl fmt::Display for FactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synthetic diagnostic record, pointing at a line of an executed method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub class_name: String,
    pub method_name: Option<String>,
    pub line_number: Option<u32>,
    pub explanation: String,
    pub fact_type: FactType,
}

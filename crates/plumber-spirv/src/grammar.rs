//! The machine-readable header grammar (`spirv.json` in the SPIR-V headers) lists every enum as
//! `{ "Name": .., "Type": .., "Values": { mnemonic: value } }` under `spv.enum`. Only the `Op` and
//! `Decoration` enums are needed here.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::names::NameTable;

/// Errors produced while loading a grammar file.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The file is not valid JSON or does not have the `spv.enum` shape.
    #[error("invalid grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A required enum (`Op` or `Decoration`) is absent.
    #[error("grammar is missing the `{0}` enum")]
    MissingEnum(&'static str),
    /// An enum value is too wide for its numeric space.
    #[error("`{enum_name}` value {name} = {value} does not fit in {width} bits")]
    ValueOutOfRange {
        /// `Op` or `Decoration`.
        enum_name: &'static str,
        /// Mnemonic of the value.
        name: String,
        /// The value as written.
        value: u64,
        /// Bits available.
        width: u32,
    },
}

#[derive(Debug, Deserialize)]
struct GrammarFile {
    spv: SpvSection,
}

#[derive(Debug, Deserialize)]
struct SpvSection {
    #[serde(rename = "enum")]
    enums: Vec<EnumDef>,
}

#[derive(Debug, Deserialize)]
struct EnumDef {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Values", default)]
    values: BTreeMap<String, u64>,
}

/// Name tables loaded from the SPIR-V header grammar.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    op_names: HashMap<u16, String>,
    op_values: HashMap<String, u16>,
    decoration_names: HashMap<u32, String>,
    decoration_values: HashMap<String, u32>,
}

impl Grammar {
    /// Loads a grammar from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Loads a grammar from a reader, such as an open `spirv.json`.
    pub fn from_reader(reader: impl Read) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(file: GrammarFile) -> Result<Self, GrammarError> {
        let mut grammar = Grammar::default();
        let mut saw_op = false;
        let mut saw_decoration = false;

        for def in file.spv.enums {
            match def.name.as_str() {
                "Op" => {
                    saw_op = true;
                    for (name, value) in def.values {
                        let value = u16::try_from(value).map_err(|_| {
                            GrammarError::ValueOutOfRange {
                                enum_name: "Op",
                                name: name.clone(),
                                value,
                                width: 16,
                            }
                        })?;
                        // Aliases share a value; keep the first name in sorted order so the
                        // reverse mapping is deterministic.
                        grammar.op_names.entry(value).or_insert_with(|| name.clone());
                        grammar.op_values.insert(name, value);
                    }
                }
                "Decoration" => {
                    saw_decoration = true;
                    for (name, value) in def.values {
                        let value = u32::try_from(value).map_err(|_| {
                            GrammarError::ValueOutOfRange {
                                enum_name: "Decoration",
                                name: name.clone(),
                                value,
                                width: 32,
                            }
                        })?;
                        grammar
                            .decoration_names
                            .entry(value)
                            .or_insert_with(|| name.clone());
                        grammar.decoration_values.insert(name, value);
                    }
                }
                _ => {}
            }
        }

        if !saw_op {
            return Err(GrammarError::MissingEnum("Op"));
        }
        if !saw_decoration {
            return Err(GrammarError::MissingEnum("Decoration"));
        }
        tracing::debug!(
            opcodes = grammar.op_values.len(),
            decorations = grammar.decoration_values.len(),
            "loaded SPIR-V grammar"
        );
        Ok(grammar)
    }
}

impl NameTable for Grammar {
    fn opcode_name(&self, opcode: u16) -> Option<&str> {
        self.op_names.get(&opcode).map(String::as_str)
    }

    fn decoration_name(&self, decoration: u32) -> Option<&str> {
        self.decoration_names.get(&decoration).map(String::as_str)
    }

    fn opcode_value(&self, name: &str) -> Option<u16> {
        self.op_values.get(name).copied()
    }

    fn decoration_value(&self, name: &str) -> Option<u32> {
        self.decoration_values.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_GRAMMAR: &str = r#"{
        "spv": {
            "meta": { "MagicNumber": 119734787, "Version": 66816, "Revision": 1 },
            "enum": [
                { "Name": "SourceLanguage", "Type": "Value", "Values": { "Unknown": 0, "GLSL": 2 } },
                { "Name": "Decoration", "Type": "Value",
                  "Values": { "Location": 30, "Binding": 33, "DescriptorSet": 34 } },
                { "Name": "Op", "Type": "Value",
                  "Values": { "OpName": 5, "OpDecorateString": 5632, "OpDecorateStringGOOGLE": 5632 } }
            ]
        }
    }"#;

    #[test]
    fn loads_op_and_decoration_enums() {
        let grammar = Grammar::from_json_str(MINI_GRAMMAR).unwrap();
        assert_eq!(grammar.opcode_name(5), Some("OpName"));
        assert_eq!(grammar.opcode_value("OpName"), Some(5));
        assert_eq!(grammar.decoration_name(34), Some("DescriptorSet"));
        assert_eq!(grammar.decoration_value("Binding"), Some(33));
        assert_eq!(grammar.opcode_name(6), None);
    }

    #[test]
    fn aliases_resolve_to_first_sorted_name() {
        let grammar = Grammar::from_json_str(MINI_GRAMMAR).unwrap();
        assert_eq!(grammar.opcode_name(5632), Some("OpDecorateString"));
        assert_eq!(grammar.opcode_value("OpDecorateStringGOOGLE"), Some(5632));
    }

    #[test]
    fn rejects_missing_enums_and_bad_json() {
        let err = Grammar::from_json_str(r#"{ "spv": { "enum": [] } }"#).unwrap_err();
        assert!(matches!(err, GrammarError::MissingEnum("Op")));

        let err = Grammar::from_json_str("{").unwrap_err();
        assert!(matches!(err, GrammarError::Json(_)));
    }

    #[test]
    fn rejects_opcode_values_wider_than_16_bits() {
        let json = r#"{ "spv": { "enum": [
            { "Name": "Op", "Values": { "OpHuge": 70000 } },
            { "Name": "Decoration", "Values": {} }
        ] } }"#;
        let err = Grammar::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::ValueOutOfRange { value: 70000, width: 16, .. }
        ));
    }
}

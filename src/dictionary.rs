// dictionary.rs - FreeRADIUS-format dictionary loader
//
// Parses the line-oriented `ATTRIBUTE` / `VENDOR` / `END-VENDOR` /
// `$INCLUDE` subset FreeRADIUS dictionaries use, and resolves attribute
// codes and names against it. Built once from a root file (and whatever it
// transitively `$INCLUDE`s) and treated as immutable afterward; safe to
// share across threads via `Arc` or a plain reference.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CodecError, Result};

/// A base (non-vendor) attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryAttribute {
    pub name: String,
    pub code: u8,
    pub type_name: String,
}

/// A vendor-specific attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryVendorAttribute {
    pub name: String,
    pub vendor_id: u32,
    pub vendor_code: u32,
    pub type_name: String,
}

/// An immutable, loaded RADIUS dictionary.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    by_code: HashMap<u8, DictionaryAttribute>,
    by_name: HashMap<String, DictionaryAttribute>,
    vendor_attributes: Vec<DictionaryVendorAttribute>,
}

struct ParseState<'a> {
    dict: &'a mut Dictionary,
    vendor_context: Option<u32>,
}

impl Dictionary {
    /// Load a dictionary from `path`, following `$INCLUDE` directives
    /// relative to each file's own directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut dict = Dictionary::default();
        let mut state = ParseState {
            dict: &mut dict,
            vendor_context: None,
        };
        parse_file(path.as_ref(), &mut state)?;
        Ok(dict)
    }

    /// Build a dictionary directly from in-memory text, useful for tests
    /// and for hosts that embed a fixed dictionary rather than shipping a
    /// file tree. `$INCLUDE` is not resolvable without a base directory and
    /// any such line is skipped.
    pub fn from_str(text: &str) -> Self {
        let mut dict = Dictionary::default();
        let mut state = ParseState {
            dict: &mut dict,
            vendor_context: None,
        };
        for (line_no, line) in text.lines().enumerate() {
            parse_line(line, line_no + 1, "<memory>", None, &mut state);
        }
        dict
    }

    /// Look up a base attribute by its wire code. Missing entries are a
    /// recoverable, per-attribute condition on inbound parsing; callers
    /// should warn and skip rather than abort.
    pub fn get_by_code(&self, code: u8) -> Option<&DictionaryAttribute> {
        self.by_code.get(&code)
    }

    /// Look up a base attribute by name. Missing entries are fatal for
    /// outbound serialization, since the caller cannot intend an anonymous
    /// attribute.
    pub fn get_by_name(&self, name: &str) -> Option<&DictionaryAttribute> {
        self.by_name.get(name)
    }

    /// Look up a vendor attribute by `(vendor_id, vendor_code)` via a
    /// linear scan. Fine at typical dictionary sizes; absence is
    /// recoverable on inbound.
    pub fn get_vendor(&self, vendor_id: u32, vendor_code: u32) -> Option<&DictionaryVendorAttribute> {
        self.vendor_attributes
            .iter()
            .find(|a| a.vendor_id == vendor_id && a.vendor_code == vendor_code)
    }

    /// Look up a vendor attribute by name (needed to serialize an outgoing
    /// VSA given only its dictionary name).
    pub fn get_vendor_by_name(&self, name: &str) -> Option<&DictionaryVendorAttribute> {
        self.vendor_attributes.iter().find(|a| a.name == name)
    }
}

fn parse_file(path: &Path, state: &mut ParseState) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let display = path.display().to_string();
    for (line_no, line) in content.lines().enumerate() {
        parse_line(line, line_no + 1, &display, Some(&dir), state)?;
    }
    Ok(())
}

/// Parse a single dictionary line, mutating `state` in place.
///
/// Numeric tokens that fail to parse, and unrecognized line kinds, are
/// silently skipped, matching FreeRADIUS's own tolerance of comments and
/// directives (`VALUE`, blank lines, etc.) this subset doesn't model.
fn parse_line(
    line: &str,
    line_no: usize,
    file_display: &str,
    dir: Option<&Path>,
    state: &mut ParseState,
) -> Result<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&keyword) = tokens.first() else {
        return Ok(());
    };

    match keyword {
        "$INCLUDE" => {
            let Some(rel) = tokens.get(1) else { return Ok(()) };
            let Some(dir) = dir else {
                tracing::warn!(
                    file = file_display,
                    line = line_no,
                    "$INCLUDE ignored outside a file context"
                );
                return Ok(());
            };
            let included: PathBuf = dir.join(rel);
            parse_file(&included, state)
        }
        "VENDOR" => {
            let Some(id_tok) = tokens.get(2) else { return Ok(()) };
            match id_tok.parse::<u32>() {
                Ok(id) => {
                    state.vendor_context = Some(id);
                    Ok(())
                }
                Err(_) => Ok(()),
            }
        }
        "END-VENDOR" => {
            state.vendor_context = None;
            Ok(())
        }
        "ATTRIBUTE" => {
            let (Some(&name), Some(&code_tok), Some(&type_tok)) =
                (tokens.get(1), tokens.get(2), tokens.get(3))
            else {
                return Ok(());
            };

            match state.vendor_context {
                Some(vendor_id) => {
                    let Ok(code) = code_tok.parse::<u32>() else {
                        return Ok(());
                    };
                    state.dict.vendor_attributes.push(DictionaryVendorAttribute {
                        name: name.to_string(),
                        vendor_id,
                        vendor_code: code,
                        type_name: type_tok.to_string(),
                    });
                }
                None => {
                    let Ok(code) = code_tok.parse::<u8>() else {
                        return Ok(());
                    };
                    let attr = DictionaryAttribute {
                        name: name.to_string(),
                        code,
                        type_name: type_tok.to_string(),
                    };
                    state.dict.by_code.insert(code, attr.clone());
                    state.dict.by_name.insert(name.to_string(), attr);
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_base_attributes() {
        let dict = Dictionary::from_str(
            "ATTRIBUTE\tUser-Name\t1\tstring\n\
             ATTRIBUTE\tUser-Password\t2\toctets\n",
        );
        assert_eq!(dict.get_by_code(1).unwrap().name, "User-Name");
        assert_eq!(dict.get_by_name("User-Password").unwrap().code, 2);
    }

    #[test]
    fn parses_vendor_block() {
        let dict = Dictionary::from_str(
            "VENDOR\tMicrosoft\t311\n\
             ATTRIBUTE\tMS-CHAP-Response\t1\toctets\n\
             END-VENDOR\tMicrosoft\n\
             ATTRIBUTE\tUser-Name\t1\tstring\n",
        );
        let vsa = dict.get_vendor(311, 1).unwrap();
        assert_eq!(vsa.name, "MS-CHAP-Response");
        // Outside the vendor block, code 1 resolves to the base attribute.
        assert_eq!(dict.get_by_code(1).unwrap().name, "User-Name");
    }

    #[test]
    fn malformed_numeric_tokens_are_skipped() {
        let dict = Dictionary::from_str(
            "ATTRIBUTE\tBroken\tnot-a-number\tstring\n\
             ATTRIBUTE\tUser-Name\t1\tstring\n",
        );
        assert!(dict.get_by_name("Broken").is_none());
        assert!(dict.get_by_name("User-Name").is_some());
    }

    #[test]
    fn unknown_type_strings_are_stored_verbatim() {
        let dict = Dictionary::from_str("ATTRIBUTE\tFuture-Attr\t200\tsome-future-type\n");
        assert_eq!(dict.get_by_code(200).unwrap().type_name, "some-future-type");
    }

    #[test]
    fn include_resolves_relative_to_current_file() {
        let dir = std::env::temp_dir().join(format!(
            "radius-codec-dict-test-{}",
            std::process::id()
        ));
        let _ = std::fs::create_dir_all(&dir);

        let included_path = dir.join("included.dict");
        let mut included = fs::File::create(&included_path).unwrap();
        writeln!(included, "ATTRIBUTE\tIncluded-Attr\t99\tstring").unwrap();

        let root_path = dir.join("root.dict");
        let mut root = fs::File::create(&root_path).unwrap();
        writeln!(root, "$INCLUDE included.dict").unwrap();
        writeln!(root, "ATTRIBUTE\tUser-Name\t1\tstring").unwrap();
        drop(root);
        drop(included);

        let dict = Dictionary::from_file(&root_path).unwrap();
        assert!(dict.get_by_code(99).is_some());
        assert!(dict.get_by_name("User-Name").is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn parsing_twice_yields_equal_indexes() {
        let text = "ATTRIBUTE\tUser-Name\t1\tstring\nVENDOR\tAcme\t9\nATTRIBUTE\tAcme-Thing\t1\toctets\nEND-VENDOR\tAcme\n";
        let a = Dictionary::from_str(text);
        let b = Dictionary::from_str(text);
        assert_eq!(a.by_code, b.by_code);
        assert_eq!(a.by_name, b.by_name);
        assert_eq!(a.vendor_attributes, b.vendor_attributes);
    }
}

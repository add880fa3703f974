//! Table schema descriptions and evolution checking
//!
//! A field is identified on the wire by its slot, not its name. Evolution
//! rules that follow from that:
//! - Appending fields at new slots is compatible both ways: old readers
//!   never look at the new slots, new readers see defaults in old data
//! - Renaming a field is compatible (warning only)
//! - Deprecating a field is compatible; old readers see its default
//! - Removing a slot outright, moving a field to another slot, or
//!   changing a field's kind is breaking

use std::collections::HashMap;

/// Wire kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    U8,
    I8,
    String,
    StringVector,
    /// Nested table of the named type
    Table(&'static str),
    /// u8 discriminant of a union
    UnionType,
    /// Table offset of a union
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub slot: u16,
    pub kind: FieldKind,
    pub deprecated: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, slot: u16, kind: FieldKind) -> Self {
        Self {
            name,
            slot,
            kind,
            deprecated: false,
        }
    }

    pub const fn deprecated(name: &'static str, slot: u16, kind: FieldKind) -> Self {
        Self {
            name,
            slot,
            kind,
            deprecated: true,
        }
    }

    /// Byte offset of this field's entry in a vtable
    pub fn voffset(&self) -> u16 {
        flatbuffers::field_index_to_field_offset(self.slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_at(&self, slot: u16) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.slot == slot)
    }

    /// Number of declared slots, the argument to `start_table`
    pub fn field_count(&self) -> usize {
        self.fields
            .iter()
            .map(|f| usize::from(f.slot) + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Types of compatibility between two versions of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityLevel {
    /// Same slots, same kinds
    FullyCompatible,
    /// New version appends or deprecates fields; both directions still decode
    ForwardCompatible,
    /// Breaking changes detected
    Incompatible,
}

/// Specific compatibility issue found during checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityIssue {
    /// A slot present in the old version is gone in the new one
    FieldRemoved {
        table: String,
        field: String,
        slot: u16,
    },
    /// The same slot carries a different wire kind
    FieldKindChanged {
        table: String,
        field: String,
        old_kind: FieldKind,
        new_kind: FieldKind,
    },
    /// A field kept its name but moved to another slot
    SlotChanged {
        table: String,
        field: String,
        old_slot: u16,
        new_slot: u16,
    },
}

/// Result of compatibility check
#[derive(Debug)]
pub struct CompatibilityReport {
    pub level: CompatibilityLevel,
    pub issues: Vec<CompatibilityIssue>,
    pub warnings: Vec<String>,
}

impl CompatibilityReport {
    pub fn compatible() -> Self {
        Self {
            level: CompatibilityLevel::FullyCompatible,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.level != CompatibilityLevel::Incompatible
    }

    pub fn add_issue(&mut self, issue: CompatibilityIssue) {
        self.level = CompatibilityLevel::Incompatible;
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Checks whether data written with `old` and `new` can be read by both
pub fn check_compatibility(old: &TableSchema, new: &TableSchema) -> CompatibilityReport {
    let mut report = CompatibilityReport::compatible();
    let mut evolved = false;

    if old.name != new.name {
        report.add_warning(format!("Table renamed from '{}' to '{}'", old.name, new.name));
    }

    let new_by_slot: HashMap<u16, &FieldDef> = new.fields.iter().map(|f| (f.slot, f)).collect();
    let new_by_name: HashMap<&str, &FieldDef> = new.fields.iter().map(|f| (f.name, f)).collect();

    for old_field in old.fields {
        match new_by_slot.get(&old_field.slot) {
            None => report.add_issue(CompatibilityIssue::FieldRemoved {
                table: old.name.to_string(),
                field: old_field.name.to_string(),
                slot: old_field.slot,
            }),
            Some(new_field) => {
                if old_field.kind != new_field.kind {
                    report.add_issue(CompatibilityIssue::FieldKindChanged {
                        table: old.name.to_string(),
                        field: old_field.name.to_string(),
                        old_kind: old_field.kind,
                        new_kind: new_field.kind,
                    });
                }
                if old_field.name != new_field.name {
                    report.add_warning(format!(
                        "Field '{}' renamed to '{}' in table '{}'",
                        old_field.name, new_field.name, old.name
                    ));
                }
                if !old_field.deprecated && new_field.deprecated {
                    evolved = true;
                    report.add_warning(format!(
                        "Field '{}' deprecated in table '{}'",
                        new_field.name, old.name
                    ));
                }
            }
        }

        if let Some(moved) = new_by_name.get(old_field.name) {
            if moved.slot != old_field.slot {
                report.add_issue(CompatibilityIssue::SlotChanged {
                    table: old.name.to_string(),
                    field: old_field.name.to_string(),
                    old_slot: old_field.slot,
                    new_slot: moved.slot,
                });
            }
        }
    }

    let old_count = old.field_count();
    for new_field in new.fields.iter().filter(|f| usize::from(f.slot) >= old_count) {
        evolved = true;
        report.add_warning(format!(
            "Field '{}' added to table '{}' at slot {}",
            new_field.name, new.name, new_field.slot
        ));
    }

    if report.level != CompatibilityLevel::Incompatible && evolved {
        report.level = CompatibilityLevel::ForwardCompatible;
    }

    report
}

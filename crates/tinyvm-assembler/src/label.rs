//! Label table: `name -> {address, refcount}`, pre-populated with register
//! aliases and the system-call labels before a source file is scanned.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
struct Label {
    address: u32,
    refcount: u32,
}

/// The assembler's symbol table, shared by both passes.
pub struct LabelTable {
    labels: HashMap<String, Label>,
}

const SYSTEM_LABELS: &[(&str, u32)] = &[
    ("__print", 0),
    ("__input", 1),
    ("__write", 2),
    ("__read", 3),
    ("__open", 4),
    ("__close", 5),
];

impl LabelTable {
    /// A fresh table holding `R0..R31` and the `__`-prefixed system labels.
    pub fn new() -> Self {
        let mut labels = HashMap::new();
        for i in 0..32u32 {
            labels.insert(
                format!("R{i}"),
                Label {
                    address: i,
                    refcount: 0,
                },
            );
        }
        for &(name, address) in SYSTEM_LABELS {
            labels.insert(
                name.to_string(),
                Label {
                    address,
                    refcount: 0,
                },
            );
        }
        Self { labels }
    }

    /// Register a user label at `address`. Returns `false` if the name
    /// collides with an existing definition (including a register alias).
    pub fn define(&mut self, name: &str, address: u32) -> bool {
        if self.labels.contains_key(name) {
            return false;
        }
        self.labels.insert(
            name.to_string(),
            Label {
                address,
                refcount: 0,
            },
        );
        true
    }

    /// Resolve `name` to its address, bumping its reference count.
    pub fn resolve(&mut self, name: &str) -> Option<u32> {
        let label = self.labels.get_mut(name)?;
        label.refcount += 1;
        Some(label.address)
    }

    /// Names of every user label that was never resolved, excluding
    /// register aliases, `main`, and `__`-prefixed system labels.
    pub fn unreferenced(&self) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|(name, label)| label.refcount == 0 && !is_exempt(name))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

fn is_exempt(label: &str) -> bool {
    let bytes = label.as_bytes();
    let is_system = bytes.len() >= 2 && bytes[0] == b'_' && bytes[1] == b'_';
    let is_main = label == "main";
    let is_register = bytes.len() > 1 && bytes[0] == b'R' && bytes[1].is_ascii_digit();
    (is_system || is_main) || is_register
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_syscalls_are_preregistered() {
        let mut table = LabelTable::new();
        assert_eq!(table.resolve("R0"), Some(0));
        assert_eq!(table.resolve("R31"), Some(31));
        assert_eq!(table.resolve("__print"), Some(0));
    }

    #[test]
    fn redefining_a_label_fails() {
        let mut table = LabelTable::new();
        assert!(table.define("loop", 4));
        assert!(!table.define("loop", 8));
    }

    #[test]
    fn unreferenced_user_labels_are_reported_but_registers_are_not() {
        let mut table = LabelTable::new();
        table.define("dead_label", 12);
        table.define("main", 0);
        let unreferenced = table.unreferenced();
        assert!(unreferenced.contains(&"dead_label"));
        assert!(!unreferenced.contains(&"main"));
        assert!(!unreferenced.contains(&"R0"));
    }
}

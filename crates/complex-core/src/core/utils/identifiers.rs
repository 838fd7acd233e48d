use phf::{Map, phf_map};

/// Suffix of the class label given to polymers without any family mapping.
pub const UNMAPPED_SUFFIX: &str = ":UNMAPPED";

/// Length of a structure identifier.
pub const STRUCTURE_ID_LEN: usize = 4;

static POLYMER_TYPE_CODES: Map<&'static str, &'static str> = phf_map! {
    "polypeptide(l)" => "P",
    "polypeptide(d)" => "P",
    "polypeptide" => "P",
    "polyribonucleotide" => "R",
    "polydeoxyribonucleotide" => "D",
    "polydeoxyribonucleotide/polyribonucleotide hybrid" => "D/R",
    "hybrid" => "D/R",
    "p" => "P",
    "r" => "R",
    "d" => "D",
    "d/r" => "D/R",
};

static UNMAPPED_CLASS_NAMES: Map<&'static str, &'static str> = phf_map! {
    "R" => "RNA",
    "D" => "DNA",
    "D/R" => "DNA/RNA",
};

/// Normalizes a polymer type name or code to one of `P`, `R`, `D` or `D/R`.
pub fn polymer_type_code(raw: &str) -> Option<&'static str> {
    POLYMER_TYPE_CODES
        .get(raw.trim().to_ascii_lowercase().as_str())
        .copied()
}

/// Class label (`RNA:UNMAPPED`, ...) for an unmapped nucleic acid polymer.
///
/// Accepts polymer type codes, polymer type names, or a label that is already in
/// class-label form. Polypeptides and unknown types yield `None`.
pub fn unmapped_polymer_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(class) = trimmed.strip_suffix(UNMAPPED_SUFFIX) {
        return UNMAPPED_CLASS_NAMES
            .values()
            .find(|name| **name == class)
            .map(|name| format!("{name}{UNMAPPED_SUFFIX}"));
    }
    let code = polymer_type_code(trimmed)?;
    UNMAPPED_CLASS_NAMES
        .get(code)
        .map(|name| format!("{name}{UNMAPPED_SUFFIX}"))
}

/// Trims and lowercases a structure identifier, rejecting anything that is not four
/// ASCII alphanumeric characters.
pub fn normalize_structure_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == STRUCTURE_ID_LEN && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(trimmed.to_ascii_lowercase())
    } else {
        None
    }
}

/// Removes `_<digits>` qualifiers from a structure token (`1abc_2` becomes `1abc`).
pub fn strip_assembly_qualifier(token: &str) -> &str {
    match token.split_once('_') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => head,
        _ => token,
    }
}

/// `<structure>_<assembly>`, the identifier recorded as assembly support.
pub fn assembly_uid(structure_id: &str, assembly_id: &str) -> String {
    format!("{structure_id}_{}", assembly_id.trim())
}

use crate::model::build_type::{BuildType, BuildTypeOption};

/// Rebuilds the selector: keeps only the first (placeholder) option and
/// appends one option per build type that carries an id.
pub fn fill_options(current: &[BuildTypeOption], build_types: &[BuildType]) -> Vec<BuildTypeOption> {
    let mut options: Vec<BuildTypeOption> = Vec::with_capacity(build_types.len() + 1);

    options.push(
        current
            .first()
            .cloned()
            .unwrap_or_else(BuildTypeOption::placeholder),
    );

    for bt in build_types {
        let id = match bt.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };

        options.push(BuildTypeOption {
            value: id.to_string(),
            text: format!("[{}] {}", id, bt.full_name),
        });
    }

    options
}

pub fn selected_build_type_id(options: &[BuildTypeOption], selected_index: usize) -> Option<&str> {
    if selected_index == 0 {
        return None;
    }
    options.get(selected_index).map(|o| o.value.as_str())
}

pub fn add_mapping_enabled(selected_index: usize) -> bool {
    selected_index != 0
}

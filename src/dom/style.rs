//! Inline `style` attribute editing.

fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

pub(super) fn get_property(style: &str, property: &str) -> Option<String> {
    declarations(style)
        .into_iter()
        .rev()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
        .map(|(_, value)| value)
}

pub(super) fn set_property(style: &str, property: &str, value: &str) -> String {
    let mut decls = declarations(style);
    decls.retain(|(name, _)| !name.eq_ignore_ascii_case(property));
    decls.push((property.to_ascii_lowercase(), value.to_string()));
    decls
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

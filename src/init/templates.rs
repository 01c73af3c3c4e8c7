use std::collections::HashMap;

pub struct CommandTemplate {
    pub name: &'static str,
    pub content: &'static str,
    pub description: &'static str,
}

// Include all prodigy-* commands from .claude/commands/ directory
// This macro is generated at compile time to include all matching files
include!(concat!(env!("OUT_DIR"), "/command_includes.rs"));

pub fn get_all_templates() -> Vec<CommandTemplate> {
    // This function is generated at compile time to include all prodigy-* commands
    get_all_command_templates()
}

pub fn get_templates_by_names(names: &[String]) -> Vec<CommandTemplate> {
    let all_templates = get_all_templates();
    let name_set: HashMap<&str, bool> = names.iter().map(|n| (n.as_str(), true)).collect();

    all_templates
        .into_iter()
        .filter(|t| name_set.contains_key(t.name))
        .collect()
}

use super::entities::{AppState, OwnerId, Project, Tag};

/// First number handed out when an owner has no projects yet.
pub const INITIAL_PROJECT_NUMBER: u64 = 2025001;

pub const COLOR_PALETTE: [&str; 10] = [
    "#dc2626", "#ea580c", "#d97706", "#059669", "#0891b2", "#2563eb", "#7c3aed", "#c026d3",
    "#4b5563", "#334155",
];

const INITIAL_TAGS: [(&str, &str, &str); 4] = [
    ("dp", "DP", "#dc2626"),
    ("colorist", "Colorist", "#7c3aed"),
    ("vfx", "VFX", "#059669"),
    ("misc", "Misc", "#4b5563"),
];

pub fn initial_tags(owner_id: &OwnerId) -> Vec<Tag> {
    INITIAL_TAGS
        .iter()
        .enumerate()
        .map(|(position, (id, name, color))| Tag {
            id: id.to_string(),
            owner_id: owner_id.clone(),
            name: name.to_string(),
            color: color.to_string(),
            position: position as u32,
        })
        .collect()
}

/// State of a fresh local store.
pub fn initial_state(owner_id: &OwnerId) -> AppState {
    AppState {
        projects: vec![],
        tags: initial_tags(owner_id),
        logs: vec![],
    }
}

/// Next number in the owner's sequence. Numbers that aren't made of digits don't take part.
pub fn next_project_number(projects: &[Project]) -> String {
    let max = projects
        .iter()
        .filter_map(|v| v.project_number.parse::<u64>().ok())
        .fold(INITIAL_PROJECT_NUMBER - 1, u64::max);
    (max + 1).to_string()
}

use log::{ info, warn };
use std::fs;

/// Used when no master plan file is configured or it cannot be read. The
/// text itself carries no semantics here; the workflow behind the webhook
/// interprets it.
pub const DEFAULT_MASTER_PLAN: &str =
    "You are the development assistant for this project. Keep answers focused on the active project goal.";

/// Loads the free-text master plan sent alongside every request.
pub fn load_master_plan(path: Option<&str>) -> String {
    let Some(path) = path else {
        return DEFAULT_MASTER_PLAN.to_string();
    };
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Loaded master plan from: {}", path);
            text.trim().to_string()
        }
        Ok(_) => {
            warn!("Master plan file '{}' is empty, using the built-in default", path);
            DEFAULT_MASTER_PLAN.to_string()
        }
        Err(e) => {
            warn!("Could not read master plan file '{}': {}. Using the built-in default", path, e);
            DEFAULT_MASTER_PLAN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_path_uses_default() {
        assert_eq!(load_master_plan(None), DEFAULT_MASTER_PLAN);
    }

    #[test]
    fn unreadable_file_uses_default() {
        assert_eq!(load_master_plan(Some("/nonexistent/plan.txt")), DEFAULT_MASTER_PLAN);
    }

    #[test]
    fn file_content_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"  Ship the InDesign script.\n").unwrap();

        let plan = load_master_plan(path.to_str());
        assert_eq!(plan, "Ship the InDesign script.");
    }

    #[test]
    fn empty_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.txt");
        std::fs::File::create(&path).unwrap();

        assert_eq!(load_master_plan(path.to_str()), DEFAULT_MASTER_PLAN);
    }
}

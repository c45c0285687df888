use std::env;
use std::path::PathBuf;

const LEGACY_ENV_FILE: &str = "api.env";

fn fallback_dotenv_path(clarity_home: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(base) = clarity_home {
        return Some(base.join(".env"));
    }
    Some(home_dir?.join(".claritycare/.env"))
}

pub fn load_dotenv() {
    let mut loaded = dotenvy::dotenv().is_ok();

    // Credentials were historically kept in `api.env` next to the app.
    if dotenvy::from_filename(LEGACY_ENV_FILE).is_ok() {
        loaded = true;
    }
    if loaded {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("CLARITY_HOME").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::metrics::Lexicons;
use crate::util::read_json;

pub mod eval;
pub mod ping;
pub mod probe;
pub mod score;

pub(crate) fn load_lexicons(path: Option<&Path>) -> Result<Lexicons> {
    match path {
        Some(path) => {
            let lexicons = read_json::<Lexicons>(path)?;
            info!(path = %path.display(), "loaded custom lexicons");
            Ok(lexicons)
        }
        None => Ok(Lexicons::default()),
    }
}

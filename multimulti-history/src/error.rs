use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// Fichier introuvable, illisible ou sans texte extractible
    #[error("Source illisible {path:?} : {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// Paramètres de jeu incohérents (taille de tirage nulle, plage inversée...)
    #[error("Paramètres de jeu invalides : {reason}")]
    InvalidConfig { reason: String },

    /// Du texte a été lu mais aucun tirage valide n'a pu être reconstruit
    #[error("Aucun historique exploitable : {reason}")]
    NoUsableHistory { reason: String },
}

impl HistoryError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        HistoryError::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

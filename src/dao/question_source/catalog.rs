use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use rand::{Rng, seq::IndexedRandom};
use thiserror::Error;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, warn};

use crate::{
    dao::models::{MovieCatalogEntity, MovieEntity},
    state::game::Question,
};

use super::{LoadError, QuestionSource};

/// Rating thresholds questions are asked about.
const RATING_THRESHOLDS: RangeInclusive<u8> = 5..=8;

/// Failures while loading the movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read movie catalog `{path}`")]
    Read {
        /// Catalog location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The catalog file is not valid JSON of the expected shape.
    #[error("failed to parse movie catalog `{path}`")]
    Parse {
        /// Catalog location.
        path: PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The catalog parsed but lists no movies.
    #[error("movie catalog `{path}` is empty")]
    Empty {
        /// Catalog location.
        path: PathBuf,
    },
}

impl From<CatalogError> for LoadError {
    fn from(err: CatalogError) -> Self {
        match std::error::Error::source(&err) {
            Some(source) => LoadError::new(format!("{err}: {source}")),
            None => LoadError::new(err.to_string()),
        }
    }
}

/// Question source drawing random movies from a JSON catalog on disk.
///
/// Each question asks whether the movie rating exceeds a random threshold.
#[derive(Clone)]
pub struct MovieCatalogSource {
    path: Arc<Path>,
    movies: Arc<RwLock<Vec<MovieEntity>>>,
}

impl MovieCatalogSource {
    /// Use the catalog at `path`. Nothing is read until [`QuestionSource::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
            movies: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn read_catalog(&self) -> Result<Vec<MovieEntity>, CatalogError> {
        let contents = fs::read_to_string(&*self.path)
            .await
            .map_err(|source| CatalogError::Read {
                path: self.path.to_path_buf(),
                source,
            })?;
        let catalog: MovieCatalogEntity =
            serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: self.path.to_path_buf(),
                source,
            })?;

        if catalog.movies.is_empty() {
            return Err(CatalogError::Empty {
                path: self.path.to_path_buf(),
            });
        }
        Ok(catalog.movies)
    }

    fn image_path(&self, movie: &MovieEntity) -> PathBuf {
        match self.path.parent() {
            Some(dir) => dir.join(&movie.image),
            None => movie.image.clone(),
        }
    }
}

impl QuestionSource for MovieCatalogSource {
    fn load(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        let source = self.clone();
        Box::pin(async move {
            let movies = source.read_catalog().await?;
            info!(
                path = %source.path.display(),
                count = movies.len(),
                "loaded movie catalog"
            );
            *source.movies.write().await = movies;
            Ok(())
        })
    }

    fn next_question(&self) -> BoxFuture<'static, Option<Question>> {
        let source = self.clone();
        Box::pin(async move {
            let picked = {
                let movies = source.movies.read().await;
                pick_movie(&movies)
            };
            let Some((movie, threshold)) = picked else {
                debug!("movie catalog not loaded; no question available");
                return None;
            };

            let image_path = source.image_path(&movie);
            match fs::read(&image_path).await {
                Ok(image) => Some(build_question(&movie, image, threshold)),
                Err(err) => {
                    warn!(
                        title = %movie.title,
                        path = %image_path.display(),
                        error = %err,
                        "failed to read movie poster"
                    );
                    None
                }
            }
        })
    }
}

fn pick_movie(movies: &[MovieEntity]) -> Option<(MovieEntity, u8)> {
    let mut rng = rand::rng();
    let movie = movies.choose(&mut rng)?.clone();
    let threshold = rng.random_range(RATING_THRESHOLDS);
    Some((movie, threshold))
}

fn build_question(movie: &MovieEntity, image: Vec<u8>, threshold: u8) -> Question {
    Question {
        image_data: image,
        text: format!("Is the rating of this movie greater than {threshold}?"),
        correct_answer: movie.rating > f32::from(threshold),
    }
}

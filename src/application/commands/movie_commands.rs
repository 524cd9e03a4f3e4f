// src/application/commands/movie_commands.rs
//
// Movie List Command Handlers

use std::path::Path;

use crate::application::dto::MovieListEntryDto;
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;
use crate::domain::{validate_movie_list_entry, MovieListEntry};
use crate::error::AppResult;

/// Filter the stored movie list by name and release year.
pub fn filter_movies(
    state: &AppState,
    name: Option<&str>,
    year: Option<i32>,
) -> Result<Vec<MovieListEntryDto>, ErrorResponse> {
    let movies = state.movie_query_service.filter_stored(name, year)?;
    Ok(movies.into_iter().map(MovieListEntryDto::from).collect())
}

/// Search the stored movie list by title and genres.
pub fn search_movies(
    state: &AppState,
    title: &str,
    genre_ids: &[u32],
) -> Result<Vec<MovieListEntryDto>, ErrorResponse> {
    if title.trim().is_empty() {
        return Err(ErrorResponse::validation("title must not be empty".to_string()));
    }

    let movies = state.movie_query_service.search_stored(title, genre_ids)?;
    Ok(movies.into_iter().map(MovieListEntryDto::from).collect())
}

/// Load a JSON array of movie previews and append it to the movie list.
/// With `replace`, the file's entries become the whole list; if that fails
/// the previous list stays as it was.
/// Returns the number of imported entries.
pub fn import_movies(state: &AppState, file: &Path, replace: bool) -> Result<usize, ErrorResponse> {
    let entries = read_movie_file(file)?;

    let saved = if replace {
        state.movie_list_repo.replace_all(&entries)?
    } else {
        state.movie_list_repo.save_all(&entries)?
    };

    log::info!("Imported {} movies from {}", saved, file.display());
    Ok(saved)
}

/// Parse and validate the whole file before anything is written.
fn read_movie_file(file: &Path) -> AppResult<Vec<MovieListEntry>> {
    let raw = std::fs::read_to_string(file)?;
    let dtos: Vec<MovieListEntryDto> = serde_json::from_str(&raw)?;

    let entries = dtos
        .into_iter()
        .map(MovieListEntryDto::into_domain)
        .collect::<AppResult<Vec<_>>>()?;
    for entry in &entries {
        validate_movie_list_entry(entry)?;
    }
    Ok(entries)
}

// src/services/movie_query_service.rs
//
// Movie List Query Service
//
// Pure, synchronous filtering over a materialized movie list.
// Never re-sorts: output order is input order.
//
// Name matching is case-insensitive and anchored at word starts:
// "u" finds "Up" but not "Dune", "the b" finds "The Batman".

use std::sync::Arc;

use crate::domain::MovieListEntry;
use crate::error::AppResult;
use crate::repositories::MovieListRepository;

pub struct MovieQueryService {
    movie_list_repo: Arc<dyn MovieListRepository>,
}

impl MovieQueryService {
    pub fn new(movie_list_repo: Arc<dyn MovieListRepository>) -> Self {
        Self { movie_list_repo }
    }

    /// Filter the stored movie list
    pub fn filter_stored(
        &self,
        name_pattern: Option<&str>,
        release_year: Option<i32>,
    ) -> AppResult<Vec<MovieListEntry>> {
        let movies = self.movie_list_repo.list_all()?;
        Ok(Self::filter(&movies, name_pattern, release_year))
    }

    /// Search the stored movie list
    pub fn search_stored(&self, title: &str, genre_ids: &[u32]) -> AppResult<Vec<MovieListEntry>> {
        let movies = self.movie_list_repo.list_all()?;
        Ok(Self::search(&movies, title, genre_ids))
    }

    /// Keep movies matching the name pattern and release year.
    /// A blank pattern or missing year does not filter.
    /// With a year, movies without a release date are excluded.
    pub fn filter(
        movies: &[MovieListEntry],
        name_pattern: Option<&str>,
        release_year: Option<i32>,
    ) -> Vec<MovieListEntry> {
        let pattern = name_pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_lowercase);

        movies
            .iter()
            .filter(|movie| {
                pattern
                    .as_deref()
                    .map_or(true, |p| title_matches(&movie.title, p))
            })
            .filter(|movie| {
                release_year.map_or(true, |year| movie.release_year() == Some(year))
            })
            .cloned()
            .collect()
    }

    /// Keep movies matching the title that carry every requested genre.
    pub fn search(movies: &[MovieListEntry], title: &str, genre_ids: &[u32]) -> Vec<MovieListEntry> {
        Self::filter(movies, Some(title), None)
            .into_iter()
            .filter(|movie| genre_ids.iter().all(|g| movie.genre_ids.contains(g)))
            .collect()
    }
}

/// `pattern` must already be lowercase.
fn title_matches(title: &str, pattern: &str) -> bool {
    let title = title.to_lowercase();
    let mut previous: Option<char> = None;

    for (index, c) in title.char_indices() {
        let at_word_start = previous.map_or(true, |p| !p.is_alphanumeric());
        if at_word_start && title[index..].starts_with(pattern) {
            return true;
        }
        previous = Some(c);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::error::AppError;
    use crate::repositories::MockMovieListRepository;

    fn movie(title: &str, year: Option<i32>, genres: &[u32]) -> MovieListEntry {
        let mut entry = MovieListEntry::new(
            title,
            year.and_then(|y| NaiveDate::from_ymd_opt(y, 6, 1)),
        );
        entry.genre_ids = genres.to_vec();
        entry
    }

    fn titles(movies: &[MovieListEntry]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_pattern_matches_word_start_ignoring_case() {
        let movies = vec![movie("Up", Some(2009), &[]), movie("Dune", Some(2021), &[])];
        let result = MovieQueryService::filter(&movies, Some("u"), None);
        assert_eq!(titles(&result), vec!["Up"]);
    }

    #[test]
    fn test_pattern_spanning_words() {
        let movies = vec![
            movie("The Batman", Some(2022), &[]),
            movie("Batman Begins", Some(2005), &[]),
            movie("Spider-Man: No Way Home", Some(2021), &[]),
        ];
        assert_eq!(
            titles(&MovieQueryService::filter(&movies, Some("THE B"), None)),
            vec!["The Batman"]
        );
        assert_eq!(
            titles(&MovieQueryService::filter(&movies, Some("man"), None)),
            vec!["Spider-Man: No Way Home"]
        );
        assert_eq!(
            titles(&MovieQueryService::filter(&movies, Some("batman"), None)),
            vec!["The Batman", "Batman Begins"]
        );
    }

    #[test]
    fn test_year_filter_and_missing_dates() {
        let movies = vec![
            movie("Dune", Some(2021), &[]),
            movie("Dune", Some(1984), &[]),
            movie("Dune", None, &[]),
        ];
        let result = MovieQueryService::filter(&movies, Some("dune"), Some(1984));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].release_year(), Some(1984));
    }

    #[test]
    fn test_no_filters_returns_everything_in_order() {
        let movies = vec![
            movie("Zodiac", Some(2007), &[]),
            movie("Alien", Some(1979), &[]),
            movie("Memento", None, &[]),
        ];
        let result = MovieQueryService::filter(&movies, Some("   "), None);
        assert_eq!(titles(&result), vec!["Zodiac", "Alien", "Memento"]);
        assert!(MovieQueryService::filter(&movies, Some("xyz"), None).is_empty());
    }

    #[test]
    fn test_search_requires_all_genres() {
        let movies = vec![
            movie("Alien", Some(1979), &[27, 878]),
            movie("Aliens", Some(1986), &[28, 27, 878]),
            movie("Alien Nation", Some(1988), &[80]),
        ];
        let result = MovieQueryService::search(&movies, "alien", &[27, 878]);
        assert_eq!(titles(&result), vec!["Alien", "Aliens"]);

        let all = MovieQueryService::search(&movies, "alien", &[]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_filter_stored_reads_repository() {
        let mut repo = MockMovieListRepository::new();
        repo.expect_list_all()
            .times(1)
            .returning(|| Ok(vec![movie("Up", Some(2009), &[]), movie("Dune", Some(2021), &[])]));

        let service = MovieQueryService::new(Arc::new(repo));
        let result = service.filter_stored(None, Some(2021)).unwrap();
        assert_eq!(titles(&result), vec!["Dune"]);
    }

    #[test]
    fn test_repository_error_propagates() {
        let mut repo = MockMovieListRepository::new();
        repo.expect_list_all()
            .returning(|| Err(AppError::Pool("unavailable".to_string())));

        let service = MovieQueryService::new(Arc::new(repo));
        assert!(service.search_stored("up", &[]).is_err());
    }
}

use std::fmt;

use crate::id::RecordId;

/// The navigable views, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Directory,
    /// `/student/{id}/marks`
    StudentMarks { student_id: RecordId },
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Directory,
            ["student", id, "marks"] => Route::StudentMarks {
                student_id: RecordId::from(*id),
            },
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> Option<String> {
        match self {
            Route::Directory => Some("/".to_string()),
            Route::StudentMarks { student_id } => Some(format!("/student/{student_id}/marks")),
            Route::NotFound => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => f.write_str(&path),
            None => f.write_str("<not found>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_views() {
        assert_eq!(Route::parse("/"), Route::Directory);
        assert_eq!(Route::parse(""), Route::Directory);
        assert_eq!(
            Route::parse("/student/42/marks/"),
            Route::StudentMarks {
                student_id: RecordId::from("42")
            }
        );
        assert_eq!(
            Route::parse("/student/abc/marks?tab=1"),
            Route::StudentMarks {
                student_id: RecordId::from("abc")
            }
        );
    }

    #[test]
    fn anything_else_is_not_found() {
        for path in ["/student", "/student/42", "/students/42/marks", "/student/42/marks/x"] {
            assert_eq!(Route::parse(path), Route::NotFound, "{path}");
        }
        assert_eq!(Route::NotFound.path(), None);
    }

    #[test]
    fn paths_parse_back() {
        let route = Route::StudentMarks {
            student_id: RecordId::from("7"),
        };
        let path = route.path().unwrap();
        assert_eq!(path, "/student/7/marks");
        assert_eq!(Route::parse(&path), route);
    }
}

//! UI state owned by the request coordinator.

use std::fmt;

use geo::{coord, Rect};
use geojson::Feature;
use routeproxy_core::models::{LngLat, PlaceSuggestion};

use crate::api::RouteSummary;

/// Address input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Start,
    End,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Start, Field::End];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Start => "start",
            Field::End => "end",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Field::Start => 0,
            Field::End => 1,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Edited; waiting for the debounce to elapse
    Typing,
    /// A suggestion request was issued for the current text
    AwaitingSuggestions,
    /// A suggestion was picked and its coordinates recorded
    Resolved,
}

/// User-facing notification raised by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SuggestionsUnavailable(Field),
    MissingCoordinates,
    RouteFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SuggestionsUnavailable(field) => {
                write!(f, "Suggestions for the {} address are unavailable", field)
            }
            Notice::MissingCoordinates => {
                f.write_str("Select both a start and an end address from the suggestions")
            }
            Notice::RouteFailed => f.write_str("Route calculation failed"),
        }
    }
}

/// State of a single address input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub text: String,
    pub coords: Option<LngLat>,
    pub suggestions: Vec<PlaceSuggestion>,
    /// Trimmed query the current `suggestions` answer, even when empty
    pub suggestions_for: Option<String>,
    pub phase: Phase,
    pub focused: bool,
}

impl FieldState {
    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolved && self.coords.is_some()
    }

    /// Whether a suggestion response for `text` has been committed
    pub fn has_answer_for(&self, text: &str) -> bool {
        self.suggestions_for.as_deref() == Some(text.trim())
    }

    pub(crate) fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestions_for = None;
    }
}

/// Route ready for rendering, with the viewport to fit
#[derive(Debug, Clone, PartialEq)]
pub struct RouteView {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub feature: Feature,
    /// Box spanning the start and end points
    pub bounds: Rect<f64>,
}

impl RouteView {
    pub fn new(summary: RouteSummary, start: LngLat, end: LngLat) -> Self {
        let bounds = Rect::new(
            coord! { x: start.lon, y: start.lat },
            coord! { x: end.lon, y: end.lat },
        );

        Self {
            distance_meters: summary.distance,
            duration_seconds: summary.duration,
            feature: summary.feature,
            bounds,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}

/// Everything a renderer needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub start: FieldState,
    pub end: FieldState,
    pub route: Option<RouteView>,
    pub is_loading: bool,
    pub notices: Vec<Notice>,
}

impl UiState {
    pub fn field(&self, field: Field) -> &FieldState {
        match field {
            Field::Start => &self.start,
            Field::End => &self.end,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
        }
    }

    /// Both endpoints, if both fields are resolved
    pub fn endpoints(&self) -> Option<(LngLat, LngLat)> {
        match (self.start.is_resolved(), self.end.is_resolved()) {
            (true, true) => Some((self.start.coords?, self.end.coords?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Geometry;

    fn summary() -> RouteSummary {
        RouteSummary {
            distance: 12345.0,
            duration: 900.0,
            feature: Feature::from(Geometry::new(geojson::Value::LineString(vec![
                vec![-3.98, 5.35],
                vec![-4.02, 5.32],
            ]))),
        }
    }

    #[test]
    fn test_bounds_are_normalized() {
        let start = LngLat::new(-3.98, 5.35).unwrap();
        let end = LngLat::new(-4.02, 5.32).unwrap();
        let view = RouteView::new(summary(), start, end);

        assert_eq!(view.bounds.min(), coord! { x: -4.02, y: 5.32 });
        assert_eq!(view.bounds.max(), coord! { x: -3.98, y: 5.35 });
        assert!((view.distance_km() - 12.345).abs() < 1e-9);
        assert_eq!(view.duration_minutes(), 15.0);
    }

    #[test]
    fn test_endpoints_require_both_resolved() {
        let mut state = UiState::default();
        state.start.coords = Some(LngLat::new(-4.02, 5.32).unwrap());
        state.start.phase = Phase::Resolved;
        assert!(state.endpoints().is_none());

        state.end.coords = Some(LngLat::new(-3.98, 5.35).unwrap());
        state.end.phase = Phase::Typing;
        assert!(state.endpoints().is_none());

        state.end.phase = Phase::Resolved;
        assert!(state.endpoints().is_some());
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::SuggestionsUnavailable(Field::End).to_string(),
            "Suggestions for the end address are unavailable"
        );
    }
}

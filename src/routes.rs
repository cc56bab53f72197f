use crate::auth::SessionState;
use std::fmt;

/// Views of the console, addressed by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Login,
    Pharmacies,
    PharmacyCreate,
    Users,
    Indicators,
    IndicatorCreate,
    IndicatorGraph,
    IndicatorRelations,
    IndicatorView(String),
    IndicatorEdit(String),
    ActionPlans,
    ActionPlanCreate,
    ActionPlanView(String),
    ActionPlanEdit(String),
    Evidences,
    EvidenceView(String),
}

impl Route {
    /// Resolves a path, ignoring any query string, fragment or trailing slash.
    /// Unknown paths give `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let id = |raw: &str| {
            urlencoding::decode(raw)
                .ok()
                .map(|s| s.into_owned())
                .filter(|s| !s.trim().is_empty())
        };

        match segments.as_slice() {
            [] => Some(Route::Dashboard),
            ["login"] => Some(Route::Login),
            ["farmacies"] => Some(Route::Pharmacies),
            ["farmacies", "create"] => Some(Route::PharmacyCreate),
            ["users"] => Some(Route::Users),
            ["indicators"] => Some(Route::Indicators),
            ["indicators", "create"] => Some(Route::IndicatorCreate),
            ["indicators", "graph"] => Some(Route::IndicatorGraph),
            ["indicators", "relations"] => Some(Route::IndicatorRelations),
            ["indicators", "view", raw] => id(*raw).map(Route::IndicatorView),
            ["indicators", "edit", raw] => id(*raw).map(Route::IndicatorEdit),
            ["action-plans"] => Some(Route::ActionPlans),
            ["action-plans", "create"] => Some(Route::ActionPlanCreate),
            ["action-plans", "view", raw] => id(*raw).map(Route::ActionPlanView),
            ["action-plans", "edit", raw] => id(*raw).map(Route::ActionPlanEdit),
            ["evidences"] => Some(Route::Evidences),
            ["evidences", "view", raw] => id(*raw).map(Route::EvidenceView),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Pharmacies => "/farmacies".to_string(),
            Route::PharmacyCreate => "/farmacies/create".to_string(),
            Route::Users => "/users".to_string(),
            Route::Indicators => "/indicators".to_string(),
            Route::IndicatorCreate => "/indicators/create".to_string(),
            Route::IndicatorGraph => "/indicators/graph".to_string(),
            Route::IndicatorRelations => "/indicators/relations".to_string(),
            Route::IndicatorView(id) => format!("/indicators/view/{}", urlencoding::encode(id)),
            Route::IndicatorEdit(id) => format!("/indicators/edit/{}", urlencoding::encode(id)),
            Route::ActionPlans => "/action-plans".to_string(),
            Route::ActionPlanCreate => "/action-plans/create".to_string(),
            Route::ActionPlanView(id) => format!("/action-plans/view/{}", urlencoding::encode(id)),
            Route::ActionPlanEdit(id) => format!("/action-plans/edit/{}", urlencoding::encode(id)),
            Route::Evidences => "/evidences".to_string(),
            Route::EvidenceView(id) => format!("/evidences/view/{}", urlencoding::encode(id)),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What the shell does with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Session not resolved yet; show the loader.
    Loading,
    RedirectToLogin,
}

/// Navigation guard. The login view always renders, even for a signed-in user.
pub fn guard(route: &Route, state: &SessionState) -> GuardDecision {
    if route.is_public() {
        return GuardDecision::Render;
    }
    match state {
        SessionState::Loading => GuardDecision::Loading,
        SessionState::SignedOut => GuardDecision::RedirectToLogin,
        SessionState::SignedIn(_) => GuardDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;
    use crate::types::UserRole;

    fn signed_in() -> SessionState {
        SessionState::SignedIn(CurrentUser {
            uid: "u1".to_string(),
            email: Some("ana@farmup.com".to_string()),
            name: "Ana".to_string(),
            role: UserRole::Admin,
            pharmacies: vec![],
            profile_id: Some("u1".to_string()),
            expires_at: None,
        })
    }

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/farmacies/create/"), Some(Route::PharmacyCreate));
        assert_eq!(Route::parse("/indicators/graph?flow=revenue"), Some(Route::IndicatorGraph));
        assert_eq!(
            Route::parse("/evidences/view/ev%201"),
            Some(Route::EvidenceView("ev 1".to_string()))
        );
        assert_eq!(Route::parse("/evidences/view/"), None);
        assert_eq!(Route::parse("/pharmacies"), None);
    }

    #[test]
    fn test_path_parses_back() {
        let routes = [
            Route::Users,
            Route::IndicatorRelations,
            Route::IndicatorView("i/1".to_string()),
            Route::ActionPlanEdit("a1".to_string()),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route.clone()));
        }
        assert_eq!(Route::ActionPlanCreate.to_string(), "/action-plans/create");
    }

    #[test]
    fn test_guard() {
        let dashboard = Route::Dashboard;
        assert_eq!(guard(&dashboard, &SessionState::Loading), GuardDecision::Loading);
        assert_eq!(guard(&dashboard, &SessionState::SignedOut), GuardDecision::RedirectToLogin);
        assert_eq!(guard(&dashboard, &signed_in()), GuardDecision::Render);

        for state in [SessionState::Loading, SessionState::SignedOut, signed_in()] {
            assert_eq!(guard(&Route::Login, &state), GuardDecision::Render);
        }
    }
}

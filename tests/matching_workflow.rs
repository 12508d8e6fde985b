//! End-to-end specifications for the matching API, driven through the
//! public router so intake, scoring, fallback, and persistence are
//! exercised together without reaching into private modules.

mod common {
    use std::sync::Arc;

    use async_trait::async_trait;

    use intern_match::catalog::Catalog;
    use intern_match::matching::{
        Candidate, Internship, InternshipId, InternshipMatch, MatchingService, MemoryStore,
        RankerError, ShortlistRanker,
    };

    pub(super) fn internship(
        title: &str,
        skills: &[&str],
        sector: Option<&str>,
        location: &str,
    ) -> Internship {
        Internship {
            id: InternshipId::generate(),
            title: title.to_string(),
            company: "Finance Solutions Ltd".to_string(),
            location: location.to_string(),
            salary: Some("₹12,000 - ₹25,000".to_string()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            description: Some("Support financial planning and analysis".to_string()),
            sector: sector.map(|s| s.to_string()),
            apply_link: None,
        }
    }

    pub(super) fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::from_internships(vec![
                internship(
                    "Financial Analyst Trainee",
                    &["Financial Modeling", "Excel", "Accounting"],
                    Some("Finance"),
                    "Mumbai",
                ),
                internship(
                    "Data Analyst Intern",
                    &["Python", "Data Analysis", "Excel"],
                    Some("IT"),
                    "Bengaluru",
                ),
                internship(
                    "Graphic Design Intern",
                    &["Adobe Illustrator", "Adobe Photoshop"],
                    Some("Design"),
                    "Pune",
                ),
            ])
            .expect("catalog builds"),
        )
    }

    /// Ranker that always fails, as a timed-out external call would.
    pub(super) struct UnavailableRanker;

    #[async_trait]
    impl ShortlistRanker for UnavailableRanker {
        async fn rank_shortlist(
            &self,
            _candidate: &Candidate,
            _shortlist: &[Internship],
        ) -> Result<Vec<InternshipMatch>, RankerError> {
            Err(RankerError::Transport("connection timed out".to_string()))
        }
    }

    pub(super) fn service() -> Arc<MatchingService<MemoryStore, UnavailableRanker>> {
        Arc::new(MatchingService::new(
            catalog(),
            Arc::new(MemoryStore::default()),
            Arc::new(UnavailableRanker),
        ))
    }
}

mod api {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use intern_match::matching::matching_router;

    use super::common::service;

    fn submission() -> Value {
        json!({
            "fullName": "Asha Verma",
            "email": "asha@example.com",
            "education": "undergraduate",
            "skills": ["Python", "Excel"],
            "sectors": ["Finance"],
            "locations": ["Any Location"],
            "language": "en"
        })
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body readable");
        serde_json::from_slice(&body).expect("body is json")
    }

    #[tokio::test]
    async fn submission_returns_ranked_matches_despite_ranker_outage() {
        let app = matching_router(service());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/matches")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(submission().to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;

        let matches = body["matches"].as_array().expect("matches array");
        // Financial Analyst Trainee: 1/2 skills + location + sector = 80
        // Data Analyst Intern: 2/2 skills + location = 70
        // Graphic Design Intern: no skill overlap, hard-filtered out
        assert_eq!(matches.len(), 2);
        assert_eq!(
            matches[0]["internship"]["title"],
            "Financial Analyst Trainee"
        );
        assert_eq!(matches[0]["matchPercentage"], 80);
        assert_eq!(matches[1]["internship"]["title"], "Data Analyst Intern");
        assert_eq!(matches[1]["matchPercentage"], 70);
        assert!(body["candidateId"].is_string());
    }

    #[tokio::test]
    async fn history_round_trips_previous_submission() {
        let service = service();

        let submit_response = matching_router(service.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/matches")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(submission().to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        let submitted = read_json(submit_response).await;
        let candidate_id = submitted["candidateId"].as_str().expect("id returned");

        let history_response = matching_router(service)
            .oneshot(
                Request::builder()
                    .uri(format!("/api/matches/{candidate_id}"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(history_response.status(), StatusCode::OK);
        let history = read_json(history_response).await;
        assert_eq!(history["matches"], submitted["matches"]);
    }

    #[tokio::test]
    async fn invalid_education_is_a_client_error() {
        let mut body = submission();
        body["education"] = json!("bootcamp");

        let response = matching_router(service())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/matches")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert!(payload["message"].is_string());
    }

    #[tokio::test]
    async fn remote_only_candidate_gets_empty_matches_not_an_error() {
        let mut body = submission();
        body["locations"] = json!(["Remote"]);

        let response = matching_router(service())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/matches")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["matches"].as_array().expect("array").len(), 0);
    }

    #[tokio::test]
    async fn vocabulary_endpoints_reflect_the_catalog() {
        let service = service();

        let skills_response = matching_router(service.clone())
            .oneshot(
                Request::builder()
                    .uri("/api/skills")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(skills_response.status(), StatusCode::OK);
        let skills = read_json(skills_response).await;
        assert!(skills["skills"]
            .as_array()
            .expect("skills array")
            .iter()
            .any(|s| s == "Financial Modeling"));

        let locations_response = matching_router(service)
            .oneshot(
                Request::builder()
                    .uri("/api/locations")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(locations_response.status(), StatusCode::OK);
        let locations = read_json(locations_response).await;
        assert_eq!(
            locations["locations"],
            json!(["Bengaluru", "Mumbai", "Pune"])
        );
    }
}

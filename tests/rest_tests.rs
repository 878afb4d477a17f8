//! Integration tests for the REST side of the API: agents, skills,
//! knowledge base ingestion, file upload and status.

mod common;

use common::{MockResponse, MockServer};
use mindsdb_link::{AgentInfo, CompletionMessage, MindsLinkError, Server, SkillInfo, SkillKind};
use serde_json::{json, Map};

fn server_for(mock: &MockServer) -> Server {
    Server::new(mock.transport().build().unwrap())
}

// =============================================================================
// Agents
// =============================================================================

#[test]
fn test_list_agents_materializes_mixed_skill_shapes() {
    let mock = MockServer::start();
    mock.on(
        "GET",
        "/api/projects/proj/agents",
        MockResponse::json(
            200,
            json!([
                {"name": "support", "model_name": "gpt", "skills": ["docs"], "params": {"prompt": "hi"}},
                {"name": "sales", "skills": [{"name": "crm", "type": "sql", "params": {}}], "created_at": "2024-01-01"}
            ]),
        ),
    );

    let agents = server_for(&mock).project("proj").list_agents().unwrap();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].name(), "support");
    assert_eq!(agents[0].info().skill_names(), vec!["docs".to_string()]);
    assert_eq!(agents[0].info().params.get("prompt"), Some(&json!("hi")));
    assert_eq!(agents[1].info().skills[0].kind, SkillKind::Sql);
    assert_eq!(agents[1].info().created_at.as_deref(), Some("2024-01-01"));
}

#[test]
fn test_create_agent_envelope() {
    let mock = MockServer::start();
    mock.on(
        "POST",
        "/api/projects/proj/agents",
        MockResponse::json(200, json!({"name": "helper", "model_name": "gpt", "skills": ["docs"]})),
    );

    let agent = AgentInfo {
        name: "helper".into(),
        model_name: Some("gpt".into()),
        provider: None,
        skills: vec![SkillInfo::retrieval("docs", "kb_docs", "product docs")],
        params: Map::new(),
        created_at: None,
        updated_at: None,
        extra: Map::new(),
    };
    let created = server_for(&mock).project("proj").create_agent(&agent).unwrap();
    assert_eq!(created.name(), "helper");

    let body = mock.requests_to("POST", "/api/projects/proj/agents")[0].json();
    assert_eq!(
        body,
        json!({"agent": {"name": "helper", "model_name": "gpt", "skills": ["docs"], "params": {}}})
    );
}

#[test]
fn test_update_agent_sends_skill_diff() {
    let mock = MockServer::start();
    mock.on(
        "GET",
        "/api/projects/proj/agents/helper",
        MockResponse::json(200, json!({"name": "helper", "skills": ["old", "kept"]})),
    );
    mock.on(
        "PUT",
        "/api/projects/proj/agents/helper",
        MockResponse::json(200, json!({"name": "helper", "skills": ["kept", "new"]})),
    );

    let updated = AgentInfo {
        name: "helper".into(),
        model_name: None,
        provider: None,
        skills: vec![
            SkillInfo::new("kept", SkillKind::Sql, Map::new()),
            SkillInfo::new("new", SkillKind::Sql, Map::new()),
        ],
        params: Map::new(),
        created_at: None,
        updated_at: None,
        extra: Map::new(),
    };
    let agent = server_for(&mock).project("proj").update_agent(&updated).unwrap();
    assert_eq!(agent.info().skill_names(), vec!["kept".to_string(), "new".to_string()]);

    let body = mock.requests_to("PUT", "/api/projects/proj/agents/helper")[0].json();
    assert_eq!(body["agent"]["skills_to_add"], json!(["new"]));
    assert_eq!(body["agent"]["skills_to_remove"], json!(["old"]));
    assert!(body["agent"].get("skills").is_none());
}

#[test]
fn test_agent_completion() {
    let mock = MockServer::start();
    mock.on(
        "GET",
        "/api/projects/proj/agents/helper",
        MockResponse::json(200, json!({"name": "helper"})),
    );
    mock.on(
        "POST",
        "/api/projects/proj/agents/helper/completions",
        MockResponse::json(200, json!({"message": {"content": "42", "context": ["doc-1"]}})),
    );

    let agent = server_for(&mock).project("proj").get_agent("helper").unwrap();
    assert_eq!(agent.ask("meaning of life?").unwrap(), "42");

    let completion = agent
        .completion(vec![CompletionMessage {
            question: "and again?".into(),
            answer: None,
        }])
        .unwrap();
    assert_eq!(completion.context, Some(json!(["doc-1"])));

    let bodies = mock.requests_to("POST", "/api/projects/proj/agents/helper/completions");
    assert_eq!(
        bodies[0].json(),
        json!({"messages": [{"question": "meaning of life?", "answer": null}]})
    );
}

#[test]
fn test_missing_agent_is_server_error() {
    let mock = MockServer::start();
    mock.on(
        "GET",
        "/api/projects/proj/agents/ghost",
        MockResponse::text(404, "Agent with name ghost does not exist"),
    );

    let err = server_for(&mock).project("proj").get_agent("ghost").unwrap_err();
    match err {
        MindsLinkError::ServerError {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 404);
            assert!(message.contains("ghost does not exist"));
        },
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_delete_agent() {
    let mock = MockServer::start();
    mock.on("DELETE", "/api/projects/proj/agents/helper", MockResponse::text(204, ""));

    server_for(&mock).project("proj").delete_agent("helper").unwrap();
    assert_eq!(mock.requests_to("DELETE", "/api/projects/proj/agents/helper").len(), 1);
}

// =============================================================================
// Skills
// =============================================================================

#[test]
fn test_create_sql_skill_envelope() {
    let mock = MockServer::start();
    mock.on(
        "POST",
        "/api/projects/proj/skills",
        MockResponse::json(
            200,
            json!({"name": "crm", "type": "sql", "params": {"database": "pg", "tables": ["deals"], "description": "CRM"}}),
        ),
    );

    let skill = SkillInfo::sql("crm", "pg", &["deals"], "CRM");
    let created = server_for(&mock).project("proj").create_skill(&skill).unwrap();
    assert_eq!(created, skill);

    let body = mock.requests_to("POST", "/api/projects/proj/skills")[0].json();
    assert_eq!(
        body,
        json!({"skill": {"name": "crm", "type": "sql", "params": {"database": "pg", "tables": ["deals"], "description": "CRM"}}})
    );
}

#[test]
fn test_update_and_list_skills() {
    let mock = MockServer::start();
    mock.on(
        "PUT",
        "/api/projects/proj/skills/docs",
        MockResponse::json(
            200,
            json!({"name": "docs", "type": "retrieval", "params": {"source": "kb2"}}),
        ),
    );
    mock.on(
        "GET",
        "/api/projects/proj/skills",
        MockResponse::json(
            200,
            json!([{"name": "docs", "type": "retrieval", "params": {}, "agent_count": 2}]),
        ),
    );

    let project = server_for(&mock).project("proj");
    let updated = project
        .update_skill(&SkillInfo::retrieval("docs", "kb2", "docs"))
        .unwrap();
    assert_eq!(updated.params.get("source"), Some(&json!("kb2")));

    let skills = project.list_skills().unwrap();
    assert_eq!(skills[0].kind, SkillKind::Retrieval);
    assert_eq!(skills[0].extra.get("agent_count"), Some(&json!(2)));
}

// =============================================================================
// Knowledge base ingestion and files
// =============================================================================

#[test]
fn test_insert_files_and_webpages() {
    let mock = MockServer::start();
    mock.on_query(MockResponse::table(
        &["NAME", "PROJECT", "PARAMS"],
        json!([["kb_docs", "proj", "{}"]]),
    ));
    mock.on(
        "PUT",
        "/api/projects/proj/knowledge_bases/kb_docs",
        MockResponse::json(200, json!({})),
    );

    let kb = server_for(&mock)
        .project("proj")
        .get_knowledge_base("kb_docs")
        .unwrap();
    kb.insert_files(&["manual.pdf"]).unwrap();
    kb.insert_webpages(&["https://docs.example.com"], 2, &[".*guide.*"])
        .unwrap();

    let puts = mock.requests_to("PUT", "/api/projects/proj/knowledge_bases/kb_docs");
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].json(), json!({"knowledge_base": {"files": ["manual.pdf"]}}));
    assert_eq!(
        puts[1].json(),
        json!({"knowledge_base": {"urls": ["https://docs.example.com"], "crawl_depth": 2, "filters": [".*guide.*"]}})
    );
}

#[test]
fn test_upload_file_is_multipart_put() {
    let mock = MockServer::start();
    mock.on("PUT", "/api/files/manual", MockResponse::json(200, json!({})));

    let transport = mock.transport().build().unwrap();
    transport
        .upload_file("manual", "manual.txt", b"hello world".to_vec())
        .unwrap();

    let request = &mock.requests_to("PUT", "/api/files/manual")[0];
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = request.body_text();
    assert!(body.contains("hello world"));
    assert!(body.contains("name=\"original_file_name\""));
    assert!(body.contains("manual.txt"));
}

#[test]
fn test_status() {
    let mock = MockServer::start();
    mock.on(
        "GET",
        "/api/status",
        MockResponse::json(
            200,
            json!({"mindsdb_version": "24.1.0", "environment": "local", "cloud": false}),
        ),
    );

    let status = server_for(&mock).status().unwrap();
    assert_eq!(status.mindsdb_version.as_deref(), Some("24.1.0"));
    assert_eq!(status.extra.get("cloud"), Some(&json!(false)));
}

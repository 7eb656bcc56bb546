/// Tests for RS256 ID token verification against a served key set
///
/// A wiremock server plays Google's securetoken JWKS endpoint; tokens are
/// signed locally with the matching private key.
use chrono::Utc;
use firebase_shared::id_token::IdTokenClaims;
use firebase_shared::{IdTokenVerifier, VerificationMode};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY_PEM: &str = include_str!("fixtures/test_rsa_key.pem");
const JWKS: &str = include_str!("fixtures/test_jwks.json");
const KID: &str = "test-key-1";

fn claims(aud: &str) -> IdTokenClaims {
    let now = Utc::now().timestamp();
    IdTokenClaims {
        aud: aud.to_string(),
        iss: format!("https://securetoken.google.com/{}", aud),
        sub: "u1".to_string(),
        exp: now + 3600,
        iat: now,
        auth_time: Some(now),
        email: Some("u1@example.com".to_string()),
    }
}

fn sign(claims: &IdTokenClaims, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

async fn jwks_server(expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "public, max-age=21600, must-revalidate")
                .set_body_raw(JWKS, "application/json"),
        )
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

fn verifier(server: &MockServer) -> IdTokenVerifier {
    IdTokenVerifier::new(
        "demo".to_string(),
        VerificationMode::Signed,
        reqwest::Client::new(),
    )
    .with_jwks_url(format!("{}/jwks", server.uri()))
}

#[tokio::test]
async fn signed_token_is_verified() {
    let server = jwks_server(1).await;

    let decoded = verifier(&server)
        .verify(&sign(&claims("demo"), KID))
        .await
        .unwrap();

    assert_eq!(decoded.uid, "u1");
    assert_eq!(decoded.claims.email.as_deref(), Some("u1@example.com"));
}

#[tokio::test]
async fn signing_keys_are_fetched_once_within_max_age() {
    let server = jwks_server(1).await;
    let verifier = verifier(&server);

    let token = sign(&claims("demo"), KID);
    assert!(verifier.verify(&token).await.is_ok());
    assert!(verifier.verify(&token).await.is_ok());
}

#[tokio::test]
async fn token_for_another_project_is_rejected() {
    let server = jwks_server(1).await;

    let err = verifier(&server)
        .verify(&sign(&claims("someone-else"), KID))
        .await
        .unwrap_err();

    assert!(err.is_invalid_id_token());
}

#[tokio::test]
async fn wrong_issuer_is_rejected() {
    let server = jwks_server(1).await;
    let mut claims = claims("demo");
    claims.iss = "https://accounts.google.com".to_string();

    let err = verifier(&server)
        .verify(&sign(&claims, KID))
        .await
        .unwrap_err();

    assert!(err.is_invalid_id_token());
}

#[tokio::test]
async fn unknown_kid_is_rejected() {
    let server = jwks_server(1).await;

    let err = verifier(&server)
        .verify(&sign(&claims("demo"), "rotated-away"))
        .await
        .unwrap_err();

    assert!(err.is_invalid_id_token());
    assert!(err.to_string().contains("unknown kid"));
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let server = jwks_server(1).await;
    let token = sign(&claims("demo"), KID);
    let other = sign(
        &IdTokenClaims {
            sub: "admin".to_string(),
            ..claims("demo")
        },
        KID,
    );

    // Signature of the first token over the payload of the second
    let mut forged: Vec<&str> = other.split('.').collect();
    forged[2] = token.split('.').nth(2).unwrap();

    let err = verifier(&server)
        .verify(&forged.join("."))
        .await
        .unwrap_err();
    assert!(err.is_invalid_id_token());
}

#[tokio::test]
async fn key_endpoint_failure_is_not_a_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = verifier(&server)
        .verify(&sign(&claims("demo"), KID))
        .await
        .unwrap_err();

    assert!(!err.is_invalid_id_token());
}

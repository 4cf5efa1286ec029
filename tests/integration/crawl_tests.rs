//! Integration tests for the sweep
//!
//! These tests use wiremock to create mock websites and run the full
//! pipeline end-to-end: roster in, crawl, merge, dataset out.

use contact_sweep::config::{
    Config, CrawlerConfig, InputConfig, OutputConfig, PhoneDedup, PhoneDiscovery, RouteStrategy,
    RoutesConfig, UserAgentConfig,
};
use contact_sweep::crawler::{sweep, Orchestrator};
use contact_sweep::records::read_roster;
use contact_sweep::{CompanyRecord, SweepError};
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTACT_ADDRESS: &str = "500 Market Street, San Francisco, CA 94105";
const FOOTER_ADDRESS: &str = "77 Elm Ave, Portland, OR 97205";

/// Creates a test configuration reading and writing inside `dir`
fn create_test_config(dir: &Path, route_policy: RouteStrategy) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_domains: 2,
            route_policy,
            default_scheme: "http".to_string(),
            page_timeout_secs: 5,
            domain_timeout_secs: 30,
            max_pages_per_domain: 50,
            max_probe_attempts: 3,
            phone_discovery: PhoneDiscovery::Accumulate,
            phone_dedup: PhoneDedup::Literal,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestSweep".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/bot".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        input: InputConfig {
            roster_path: dir.join("websites.csv").display().to_string(),
        },
        output: OutputConfig {
            dataset_path: dir.join("companies.csv").display().to_string(),
        },
        routes: RoutesConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Mounts a small company site:
/// - `/` links to `/contact` and to a long blog slug, with an address in its footer
/// - `/contact` holds the contact address, a phone number and a social link
/// - `/blog/...` must never be fetched
async fn mount_company_site(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
                <nav>
                    <a href="/contact">Contact</a>
                    <a href="/blog/post-one-two-three-four-five">Blog</a>
                </nav>
                <h1>Timent</h1>
                <footer>{}</footer>
            </body></html>"#,
            FOOTER_ADDRESS
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(html(format!(
            r#"<html><body>
                <div class="contact-details">
                    <p>Visit us:</p>
                    <p>{}</p>
                    <p>Call (415) 626-4474</p>
                </div>
                <a href="https://facebook.com/timent">Facebook</a>
                <a href="/">Home</a>
            </body></html>"#,
            CONTACT_ADDRESS
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog/post-one-two-three-four-five"))
        .respond_with(html("<p>Call 0800 999 8888</p>".to_string()))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_sweep_single_domain() {
    let server = MockServer::start().await;
    mount_company_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(dir.path(), RouteStrategy::Deny);
    std::fs::write(
        &config.input.roster_path,
        format!("domain,company_commercial_name\n{},Timent\n", server.uri()),
    )
    .expect("Failed to write roster");

    let report = sweep(&config, CancellationToken::new())
        .await
        .expect("Sweep failed");

    assert_eq!(report.counters.websites_total, 1);
    assert_eq!(report.counters.websites_crawled, 1);
    assert_eq!(report.counters.phones_found, 1);
    assert_eq!(report.counters.addresses_found, 1);
    assert_eq!(report.counters.social_links_found, 1);

    let dataset = read_roster(Path::new(&config.output.dataset_path))
        .expect("Failed to read dataset")
        .records;
    assert_eq!(dataset.len(), 1);

    let record = &dataset[0];
    assert_eq!(record.commercial_name.as_deref(), Some("Timent"));
    assert_eq!(record.physical_addresses, vec![CONTACT_ADDRESS.to_string()]);
    assert_eq!(record.phone_numbers, vec!["(415) 626-4474".to_string()]);
    assert_eq!(
        record.social_media_links,
        vec!["https://facebook.com/timent".to_string()]
    );
}

#[tokio::test]
async fn test_traversal_visits_root_and_contact_only() {
    let server = MockServer::start().await;
    mount_company_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(dir.path(), RouteStrategy::Deny);
    let orchestrator = Orchestrator::new(&config).expect("Failed to build orchestrator");

    let outcome = orchestrator
        .crawl_domain(&server.uri(), &CancellationToken::new())
        .await;

    let phones: Vec<&String> = outcome.data.phone_numbers.iter().collect();
    assert_eq!(phones, vec!["(415) 626-4474"]);
    assert!(!outcome
        .data
        .physical_addresses
        .iter()
        .any(|address| address == FOOTER_ADDRESS));
    assert_eq!(orchestrator.browser().open_surfaces(), 0);
}

#[tokio::test]
async fn test_allow_policy_also_reaches_contact_page() {
    let server = MockServer::start().await;
    mount_company_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(dir.path(), RouteStrategy::Allow);
    let orchestrator = Orchestrator::new(&config).expect("Failed to build orchestrator");

    let outcome = orchestrator
        .crawl_domain(&server.uri(), &CancellationToken::new())
        .await;

    assert_eq!(outcome.data.phone_numbers.len(), 1);
    assert_eq!(outcome.data.physical_addresses.len(), 1);
}

#[tokio::test]
async fn test_sweep_with_unreachable_domain_and_existing_findings() {
    let server = MockServer::start().await;
    mount_company_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(dir.path(), RouteStrategy::Deny);
    std::fs::write(
        &config.input.roster_path,
        format!(
            "domain,phone_numbers,country\n\
             {},0800 123 4567,US\n\
             127.0.0.1:9,,DE\n\
             ,,FR\n",
            server.uri()
        ),
    )
    .expect("Failed to write roster");

    let report = sweep(&config, CancellationToken::new())
        .await
        .expect("Sweep failed");

    assert_eq!(report.counters.websites_total, 2);
    assert_eq!(report.counters.websites_crawled, 1);
    assert_eq!(report.counters.websites_unreachable, 1);

    let dataset = read_roster(Path::new(&config.output.dataset_path))
        .expect("Failed to read dataset")
        .records;
    assert_eq!(dataset.len(), 2);

    // Existing phone numbers are never overwritten
    assert_eq!(dataset[0].phone_numbers, vec!["0800 123 4567".to_string()]);
    assert_eq!(dataset[0].physical_addresses, vec![CONTACT_ADDRESS.to_string()]);
    assert_eq!(dataset[0].extra.get("country").map(String::as_str), Some("US"));

    assert_eq!(dataset[1], {
        let mut record = CompanyRecord::new("127.0.0.1:9");
        record.extra.insert("country".to_string(), "DE".to_string());
        record
    });
}

#[tokio::test]
async fn test_sweep_rejects_invalid_config_before_reading_roster() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(dir.path(), RouteStrategy::Deny);
    config.crawler.max_concurrent_domains = 0;

    let result = sweep(&config, CancellationToken::new()).await;

    assert!(matches!(result, Err(SweepError::Config(_))));
    assert!(!Path::new(&config.output.dataset_path).exists());
}

#[tokio::test]
async fn test_empty_roster_columns_survive_in_dataset() {
    let server = MockServer::start().await;
    mount_company_site(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(dir.path(), RouteStrategy::Deny);
    std::fs::write(
        &config.input.roster_path,
        format!("domain,company_legal_name,region\n{},,\n", server.uri()),
    )
    .expect("Failed to write roster");

    sweep(&config, CancellationToken::new())
        .await
        .expect("Sweep failed");

    let dataset = read_roster(Path::new(&config.output.dataset_path))
        .expect("Failed to read dataset");
    assert_eq!(
        dataset.columns,
        vec![
            "domain",
            "company_legal_name",
            "region",
            "physical_addresses",
            "social_media_links",
            "phone_numbers",
        ]
    );
}

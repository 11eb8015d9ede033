use podcast_tts_backend::domain::tts::RetryPolicy;
use podcast_tts_backend::infrastructure::config::{
    Config, Environment, GoogleConfig, LogFormat, PodcastConfig, SynthesisConfig,
};
use podcast_tts_backend::infrastructure::http::create_app;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use wiremock::MockServer;

pub mod api_client;
pub mod assertions;

use api_client::TestClient;

pub const PROJECT_ID: &str = "pod-project";
pub const BUCKET: &str = "pod-audio";

pub struct TestContext {
    pub client: TestClient,
    pub google: MockServer,
    pub config: Config,
    _dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        Self::start(false)
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Temporary directory and mock server are dropped with the context
        }
    }
}

impl TestContext {
    /// Boot the app against a fresh mock server. With `long_audio`, a service
    /// account key, project and bucket are configured so long scripts go
    /// through the long-running synthesis path.
    pub async fn start(long_audio: bool) -> Self {
        let google = MockServer::start().await;
        let dir = TempDir::new().expect("Failed to create temp dir");

        let service_account_file = if long_audio {
            Some(google_mocks::write_service_account_key(&google, dir.path()))
        } else {
            None
        };

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0, // Will be assigned by the OS
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            google: GoogleConfig {
                api_key: Some("test-key".to_string()),
                project_id: long_audio.then(|| PROJECT_ID.to_string()),
                bucket: long_audio.then(|| BUCKET.to_string()),
                service_account_file,
                tts_api_url: format!("{}/v1/text:synthesize", google.uri()),
                long_audio_api_url: format!("{}/v1beta1", google.uri()),
                storage_api_url: format!("{}/storage/v1", google.uri()),
                ..GoogleConfig::default()
            },
            synthesis: SynthesisConfig {
                poll_interval: Duration::from_millis(10),
                max_polls: 5,
                retry: RetryPolicy::immediate(3),
                ..SynthesisConfig::default()
            },
            podcast: PodcastConfig {
                scripts_dir: dir.path().join("scripts"),
                audio_dir: dir.path().join("audio"),
                batch_max_workers: 3,
            },
            tts_cache_enabled: false, // Disable cache in tests to avoid test pollution
        };

        let app = create_app(Arc::new(config.clone())).await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: TestClient::new(&base_url),
            google,
            config,
            _dir: dir,
        }
    }

    /// Write `scripts/<team>/<date>.<extension>`
    pub fn write_script(&self, team: &str, date: &str, extension: &str, content: &str) {
        let team_dir = self.config.podcast.scripts_dir.join(team);
        std::fs::create_dir_all(&team_dir).expect("Failed to create script dir");
        std::fs::write(team_dir.join(format!("{}.{}", date, extension)), content)
            .expect("Failed to write script");
    }

    pub fn audio_path(&self, team: &str, date: &str, extension: &str) -> PathBuf {
        self.config
            .podcast
            .audio_dir
            .join(team)
            .join(format!("{}.{}", date, extension))
    }
}

//! The `enrich` command: JSON file in, JSON file out.

use futures::StreamExt;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::enrichment::{
    AlbumRecord, EnrichedRecord, EnrichmentService, ProviderError, ProviderId, TracingSink,
};
use crate::error::{Error, Result, ResultExt};

/// Credentials given on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct CredentialOverrides {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub discogs_api_token: Option<String>,
}

impl CredentialOverrides {
    fn apply(self, config: &mut Config) {
        let creds = &mut config.credentials;
        if self.spotify_client_id.is_some() {
            creds.spotify_client_id = self.spotify_client_id;
        }
        if self.spotify_client_secret.is_some() {
            creds.spotify_client_secret = self.spotify_client_secret;
        }
        if self.discogs_api_token.is_some() {
            creds.discogs_api_token = self.discogs_api_token;
        }
    }
}

/// A record in the output file.
///
/// Records that were not reached before an interrupt are written back
/// exactly as they were read.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OutputRecord {
    Enriched(EnrichedRecord),
    Untouched(AlbumRecord),
}

/// Link counts for a finished (or interrupted) run
#[derive(Debug, Default, PartialEq)]
struct Summary {
    total: usize,
    enriched: usize,
    links: Vec<(ProviderId, usize)>,
    previews: usize,
}

impl Summary {
    fn new(total: usize, enriched: &[EnrichedRecord]) -> Self {
        let links = ProviderId::ALL
            .iter()
            .map(|p| (*p, enriched.iter().filter(|r| r.link(*p).is_some()).count()))
            .collect();

        Self {
            total,
            enriched: enriched.len(),
            links,
            previews: enriched.iter().filter(|r| r.preview_url.is_some()).count(),
        }
    }

    fn print(&self) {
        println!();
        println!("Processed {}/{} albums", self.enriched, self.total);
        for (provider, found) in &self.links {
            println!("  {:<12} {}/{}", provider.as_str(), found, self.enriched);
        }
        println!("  {:<12} {}/{}", "preview", self.previews, self.enriched);
    }
}

/// Enrich every record in `file` with provider links
pub fn cmd_enrich(
    rt: &Runtime,
    file: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    overrides: CredentialOverrides,
    dry_run: bool,
) -> anyhow::Result<()> {
    let config = resolve_config(config_path, overrides)?;
    let records = read_records(file)?;
    let destination = output.unwrap_or(file).to_path_buf();

    if records.is_empty() {
        println!("No albums in {:?}, nothing to do.", file);
        return Ok(());
    }

    let service = EnrichmentService::from_config(&config, Arc::new(TracingSink))?;
    println!(
        "Enriching {} albums from {:?} using {}",
        records.len(),
        file,
        service
            .active_providers()
            .iter()
            .map(ProviderId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    rt.block_on(enrich_records(&service, records, &destination, dry_run))
}

async fn enrich_records(
    service: &EnrichmentService,
    records: Vec<AlbumRecord>,
    destination: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    service.verify().await.map_err(credential_hint)?;

    let total = records.len();
    let (enriched, interrupted) = run_until_interrupted(service, records.clone()).await;

    let summary = Summary::new(total, &enriched);
    if interrupted {
        println!(
            "\nInterrupted: keeping {} enriched albums, {} left as they were",
            enriched.len(),
            total - enriched.len()
        );
    }

    if dry_run {
        summary.print();
        println!("\nDry run: nothing written.");
        return Ok(());
    }

    let done = enriched.len();
    let output: Vec<OutputRecord> = enriched
        .into_iter()
        .map(OutputRecord::Enriched)
        .chain(records.into_iter().skip(done).map(OutputRecord::Untouched))
        .collect();
    write_records(destination, &output)?;

    summary.print();
    println!("\nWrote {:?}", destination);
    Ok(())
}

/// Drive the batch until it finishes or Ctrl-C arrives.
///
/// Returns the records finished so far, in input order, and whether the run
/// was cut short.
async fn run_until_interrupted(
    service: &EnrichmentService,
    records: Vec<AlbumRecord>,
) -> (Vec<EnrichedRecord>, bool) {
    let total = records.len();
    let mut enriched = Vec::with_capacity(total);

    let stream = service.enrich_stream(records);
    tokio::pin!(stream);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(record) => {
                    println!(
                        "[{}/{}] {} - {}: {}/{} links",
                        enriched.len() + 1,
                        total,
                        record.record.artist,
                        record.record.album,
                        record.links_found(),
                        ProviderId::ALL.len()
                    );
                    enriched.push(record);
                }
                None => return (enriched, false),
            },
            _ = &mut ctrl_c => {
                tracing::warn!("Interrupt received, stopping after {} albums", enriched.len());
                return (enriched, true);
            }
        }
    }
}

fn resolve_config(path: Option<&Path>, overrides: CredentialOverrides) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

fn credential_hint(err: ProviderError) -> anyhow::Error {
    eprintln!("Error: provider credentials were rejected or are missing.");
    eprintln!("Set SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and DISCOGS_API_TOKEN,");
    eprintln!("pass them as flags, or disable the provider in the config file.");
    Error::from(err).into()
}

/// Read the input file as a JSON array of album records
fn read_records(path: &Path) -> Result<Vec<AlbumRecord>> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }

    let text = std::fs::read_to_string(path).with_context(format!("reading {:?}", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(format!("parsing {:?}", path))?;

    if !value.is_array() {
        return Err(Error::invalid_input(path, "expected a JSON array of album records"));
    }

    serde_json::from_value(value).map_err(|e| Error::invalid_input(path, e.to_string()))
}

/// Write records as pretty JSON through a temp file and a rename
fn write_records(path: &Path, records: &[OutputRecord]) -> Result<()> {
    let contents = serde_json::to_string_pretty(records)?;

    let temp_path = temp_path_for(path);
    std::fs::write(&temp_path, contents).with_context(format!("writing {:?}", temp_path))?;
    std::fs::rename(&temp_path, path).with_context(format!("replacing {:?}", path))?;

    tracing::info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::album_record;

    fn enriched(artist: &str, album: &str, spotify: Option<&str>) -> EnrichedRecord {
        EnrichedRecord {
            record: album_record(artist, album),
            spotify_link: spotify.map(String::from),
            deezer_link: None,
            discogs_link: None,
            musicbrainz_link: None,
            preview_url: None,
        }
    }

    #[test]
    fn test_read_records_keeps_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        std::fs::write(
            &path,
            r#"[{"artist": "Daft Punk", "album": "Discovery", "year": 2001}]"#,
        )
        .unwrap();

        let records = read_records(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].artist, "Daft Punk");
        assert_eq!(records[0].extra["year"], 2001);
    }

    #[test]
    fn test_read_records_rejects_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        std::fs::write(&path, r#"{"artist": "Daft Punk", "album": "Discovery"}"#).unwrap();

        assert!(matches!(read_records(&path), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_read_records_rejects_record_without_album() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        std::fs::write(&path, r#"[{"artist": "Daft Punk"}]"#).unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("album"));
    }

    #[test]
    fn test_read_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        assert!(matches!(read_records(&path), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_write_mixes_enriched_and_untouched_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        let output = vec![
            OutputRecord::Enriched(enriched(
                "Daft Punk",
                "Discovery",
                Some("https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc"),
            )),
            OutputRecord::Untouched(album_record("Air", "Moon Safari")),
        ];

        write_records(&path, &output).unwrap();

        let written: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            written[0]["spotify_link"],
            "https://open.spotify.com/album/2noRn2Aes5aoNVsU6iWThc"
        );
        assert!(written[0]["deezer_link"].is_null());
        assert!(written[1].get("spotify_link").is_none());
        assert_eq!(written[1]["album"], "Moon Safari");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_written_file_reads_back_as_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        let output = vec![OutputRecord::Enriched(enriched("Daft Punk", "Discovery", None))];

        write_records(&path, &output).unwrap();
        let records = read_records(&path).unwrap();

        assert_eq!(records[0].album, "Discovery");
        assert!(records[0].extra.contains_key("spotify_link"));
    }

    #[test]
    fn test_temp_path_sits_next_to_target() {
        let path = Path::new("/data/albums.json");
        assert_eq!(temp_path_for(path), PathBuf::from("/data/albums.json.tmp"));
    }

    #[test]
    fn test_overrides_replace_config_credentials() {
        let mut config = Config::default();
        config.credentials.discogs_api_token = Some("from-file".into());
        config.credentials.spotify_client_id = Some("file-id".into());

        CredentialOverrides {
            discogs_api_token: Some("from-env".into()),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.credentials.discogs_api_token.as_deref(), Some("from-env"));
        assert_eq!(config.credentials.spotify_client_id.as_deref(), Some("file-id"));
    }

    #[test]
    fn test_explicit_config_path_must_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[batch\nconcurrency = ").unwrap();

        assert!(resolve_config(Some(&path), CredentialOverrides::default()).is_err());
    }

    #[test]
    fn test_summary_counts_links() {
        let records = vec![
            enriched("Daft Punk", "Discovery", Some("https://open.spotify.com/album/a")),
            enriched("Air", "Moon Safari", None),
        ];

        let summary = Summary::new(3, &records);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.enriched, 2);
        assert_eq!(summary.links[0], (ProviderId::Spotify, 1));
        assert_eq!(summary.links[1], (ProviderId::Deezer, 0));
        assert_eq!(summary.previews, 0);
    }
}

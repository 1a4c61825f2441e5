//! Subcommand dispatch.

use std::{path::Path, time::Duration};

use neuroviz_client::{
    ApiClient, ClientConfig, CreateSessionForm, FileTokenStore, PreprocessRequest,
    ReqwestTransport, SystemEnv, UploadFile,
};

use crate::{
    args::{AnalysisKind, Args, Command, JOB_MAX_POLLS, JOB_POLL_INTERVAL},
    error::CliError,
    output::write_json,
    stream::{self, StreamOptions},
};

type Client = ApiClient<ReqwestTransport, FileTokenStore, SystemEnv>;

/// Run the parsed command.
pub async fn run(args: Args) -> Result<(), CliError> {
    if let Command::Stream { channels, duration, samples, tick_ms, connect_timeout } = args.command {
        return stream::run(StreamOptions {
            url: args.stream_url,
            channels,
            tick: Duration::from_millis(tick_ms),
            connect_timeout: Duration::from_secs(connect_timeout),
            duration: duration.map(Duration::from_secs),
            samples,
        })
        .await;
    }

    let mut client = connect(&args.api_url, &args.token_file)?;
    let result = rest(&mut client, args.command).await;
    if matches!(&result, Err(CliError::Api(e)) if e.requires_login()) {
        tracing::warn!("not logged in, run `neuroviz login`");
    }
    result
}

fn connect(api_url: &str, token_file: &Path) -> Result<Client, CliError> {
    let config = ClientConfig::with_base_url(api_url);
    let transport =
        ReqwestTransport::new(&config).map_err(|e| CliError::HttpSetup(e.to_string()))?;
    tracing::debug!(base_url = %config.base_url, token_file = %token_file.display(), "api client ready");
    Ok(ApiClient::new(transport, FileTokenStore::new(token_file), SystemEnv::new(), config))
}

async fn rest(client: &mut Client, command: Command) -> Result<(), CliError> {
    match command {
        // Handled before the client is built
        Command::Stream { .. } => Ok(()),
        Command::Login { email, password } => {
            let response = client.login(&email, &password).await?;
            write_json(&response.user)
        },
        Command::Logout => {
            client.logout()?;
            Ok(())
        },
        Command::Whoami => write_json(&client.current_user().await?),
        Command::Sessions { page, size, search } => match search {
            Some(name) => write_json(&client.search_sessions(&name).await?),
            None => write_json(&client.sessions(page, size).await?),
        },
        Command::Session { id } => write_json(&client.session(id).await?),
        Command::Upload { name, file, description, notes } => {
            let file = match file {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let form = CreateSessionForm { name, description, notes, file };
            write_json(&client.create_session(form).await?)
        },
        Command::Preprocess { id, bandpass, notch, artifact, wait } => {
            let params = PreprocessRequest {
                bandpass: bandpass.map(|range| bandpass_range(&range)).transpose()?,
                notch,
                artifact: artifact.then_some(true),
            };
            let job = client.preprocess(id, &params).await?;
            if wait {
                write_json(&client.wait_for_job(job.id, JOB_POLL_INTERVAL, JOB_MAX_POLLS).await?)
            } else {
                write_json(&job)
            }
        },
        Command::Analyze { id, channel, kind } => match kind {
            AnalysisKind::Psd => write_json(&client.psd(id, &channel).await?),
            AnalysisKind::Bands => write_json(&client.band_power(id, &channel).await?),
        },
        Command::Classify { id } => write_json(&client.classify(id).await?),
        Command::Job { id, wait, interval, max_polls } => {
            let job = if wait {
                client.wait_for_job(id, Duration::from_secs(interval), max_polls).await?
            } else {
                client.job(id).await?
            };
            write_json(&job)
        },
    }
}

async fn read_upload(path: &Path) -> Result<UploadFile, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidArgument(format!("{} is not a file", path.display())))?;
    Ok(UploadFile { file_name, content_type: None, bytes })
}

fn bandpass_range(values: &[f64]) -> Result<[f64; 2], CliError> {
    match values {
        &[low, high] if low < high => Ok([low, high]),
        _ => Err(CliError::InvalidArgument(
            "--bandpass takes LOW,HIGH with LOW below HIGH".to_owned(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bandpass_needs_ordered_pair() {
        assert_eq!(bandpass_range(&[1.0, 40.0]).unwrap(), [1.0, 40.0]);
        assert!(bandpass_range(&[40.0, 1.0]).is_err());
        assert!(bandpass_range(&[1.0]).is_err());
        assert!(bandpass_range(&[1.0, 2.0, 3.0]).is_err());
    }

    #[tokio::test]
    async fn upload_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.edf");
        std::fs::write(&path, [7u8, 8, 9]).unwrap();

        let upload = read_upload(&path).await.unwrap();

        assert_eq!(upload.file_name, "rec.edf");
        assert_eq!(upload.bytes, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn missing_upload_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload(&dir.path().join("absent.edf")).await.unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}

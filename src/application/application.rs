use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, error, info, warn};

use fsmirror::{
    MapError, MapRequest, Mapper, Node, NotifySource, RequestError, WatchError,
    ext::BestEffortPathExt,
};

use crate::application::RuntimeConfig;
use crate::application::render::{RenderError, configure_color, render, render_batch};
use crate::config::{RequestFile, RequestFileError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let mut requests = app_config.requests.clone();
        if let Some(roots_file) = &app_config.roots_file {
            let file = RequestFile::read(roots_file).await.context(RequestFileSnafu)?;
            debug!(
                "Loaded {} roots from {}",
                file.requests.len(),
                roots_file.best_effort_path_display()
            );
            requests.extend(file.requests);
        }
        ensure!(!requests.is_empty(), NoRequestsSnafu);
        configure_color();

        let mapper = Mapper::new();
        if requests.len() == 1 && requests[0].name.is_none() {
            let request = requests.remove(0);
            return Self::run_single(&mapper, request, &app_config).await;
        }

        ensure!(!app_config.watch, WatchNeedsSingleRootSnafu);
        Self::run_batch(&mapper, requests, &app_config).await
    }

    async fn run_single(
        mapper: &Mapper,
        request: MapRequest,
        app_config: &RuntimeConfig,
    ) -> Result<(), ApplicationError> {
        let resolved = request.resolve().context(InvalidRequestSnafu)?;
        let node = mapper
            .map_path(&resolved.root, &resolved.options)
            .await
            .context(MappingSnafu)?;
        println!("{}", render(&node, app_config.format).context(RenderSnafu)?);

        if !app_config.watch {
            return Ok(());
        }
        let Node::Folder(folder) = node else {
            return WatchFileRootSnafu { path: resolved.root }.fail();
        };

        info!("Watching {}", folder.path().best_effort_path_display());
        let format = app_config.format;
        mapper
            .watch_remap(
                &NotifySource,
                folder,
                resolved.options,
                app_config.persistent,
                |folder, result| {
                    if let Err(error) = result {
                        warn!("Keeping the previous output: {}", error);
                        return;
                    }
                    match render(&folder.clone().into(), format) {
                        Ok(output) => println!("{output}"),
                        Err(error) => warn!("Failed to render remapped tree: {}", error),
                    }
                },
            )
            .await
            .context(WatchSnafu)?;

        Ok(())
    }

    async fn run_batch(
        mapper: &Mapper,
        requests: Vec<MapRequest>,
        app_config: &RuntimeConfig,
    ) -> Result<(), ApplicationError> {
        let total = requests.len();
        let outcome = mapper.map_batch(requests).await;
        println!(
            "{}",
            render_batch(&outcome.tree, app_config.format).context(RenderSnafu)?
        );

        for error in &outcome.errors {
            error!("{}", snafu::Report::from_error(error));
        }
        ensure!(
            outcome.is_complete(),
            BatchIncompleteSnafu {
                failed: outcome.errors.len(),
                total
            }
        );
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the request file"))]
    RequestFileError { source: RequestFileError },
    #[snafu(display("Nothing to map: pass at least one path or a request file"))]
    NoRequestsError,
    #[snafu(display("Invalid mapping request"))]
    InvalidRequestError { source: RequestError },
    #[snafu(display("Critical failure encountered during mapping"))]
    MappingError { source: MapError },
    #[snafu(display("Failed to render the mirror"))]
    RenderError { source: RenderError },
    #[snafu(display("Critical failure encountered while watching"))]
    WatchError { source: WatchError },
    #[snafu(display("Watching needs exactly one unnamed root"))]
    WatchNeedsSingleRootError,
    #[snafu(display("Cannot watch {}: it is not a directory", path.best_effort_path_display()))]
    WatchFileRootError { path: PathBuf },
    #[snafu(display("{} of {} roots failed to map", failed, total))]
    BatchIncompleteError { failed: usize, total: usize },
}

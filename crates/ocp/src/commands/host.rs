//! Host command handlers.
//!
//! One generic runner drives every variant; the `--kind` flag only picks
//! the reconciler and the declared-state type.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use ocp_api::GraphQlClient;
use ocp_core::{
    HostKind, ImmutableHostReconciler, Lifecycle, Reconciler, RemoteId, ShadowHostReconciler,
    VirtualHostReconciler,
};

use crate::cli::{HostArgs, HostCommand, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::state;

/// What a host command printed about its run.
#[derive(Debug, Serialize)]
struct Summary {
    kind: HostKind,
    action: String,
    id: Option<String>,
}

pub async fn handle(
    client: Arc<GraphQlClient>,
    args: HostArgs,
    format: OutputFormat,
) -> Result<(), CliError> {
    let kind = match &args.command {
        HostCommand::Apply(a) => a.target.kind,
        HostCommand::Refresh(t) | HostCommand::Destroy(t) => t.kind,
        HostCommand::Import(a) => a.target.kind,
    };

    let summary = match kind {
        HostKind::Standard => run(VirtualHostReconciler::new(client), args.command).await?,
        HostKind::Immutable => run(ImmutableHostReconciler::new(client), args.command).await?,
        HostKind::Shadow => run(ShadowHostReconciler::new(client), args.command).await?,
    };

    let rendered = output::render(format, &summary, |s| s.id.clone().unwrap_or_default())?;
    output::print_output(&rendered)
}

async fn run<R>(reconciler: R, command: HostCommand) -> Result<Summary, CliError>
where
    R: Reconciler,
    R::Desired: DeserializeOwned,
    R::Observed: Serialize + DeserializeOwned,
{
    let kind = reconciler.kind();
    let lifecycle = Lifecycle::new(reconciler);
    let id_of = |observed: &R::Observed| lifecycle.reconciler().remote_id(observed).to_string();

    match command {
        HostCommand::Apply(args) => {
            let desired: R::Desired = read_desired(&args.file)?;
            let prior = state::load::<R::Observed>(&args.target.state, kind)?;
            let applied = lifecycle.apply(prior.as_ref(), &desired).await?;

            let id = match applied.state {
                Some(ref current) => {
                    state::save(&args.target.state, kind, current)?;
                    Some(id_of(current))
                }
                None => {
                    state::remove(&args.target.state)?;
                    None
                }
            };
            Ok(Summary {
                kind,
                action: applied.action.to_string(),
                id,
            })
        }

        HostCommand::Refresh(target) => {
            let prior = state::require::<R::Observed>(&target.state, kind)?;
            match lifecycle.refresh(&prior).await? {
                Some(current) => {
                    state::save(&target.state, kind, &current)?;
                    Ok(Summary {
                        kind,
                        action: "refreshed".into(),
                        id: Some(id_of(&current)),
                    })
                }
                None => {
                    state::remove(&target.state)?;
                    Ok(Summary {
                        kind,
                        action: "forgotten".into(),
                        id: None,
                    })
                }
            }
        }

        HostCommand::Destroy(target) => {
            let prior = state::require::<R::Observed>(&target.state, kind)?;
            lifecycle.destroy(&prior).await?;
            state::remove(&target.state)?;
            Ok(Summary {
                kind,
                action: "destroyed".into(),
                id: Some(id_of(&prior)),
            })
        }

        HostCommand::Import(args) => {
            if let Some(held) = state::load::<R::Observed>(&args.target.state, kind)? {
                return Err(CliError::StateConflict {
                    path: args.target.state.display().to_string(),
                    id: id_of(&held),
                });
            }
            let imported = lifecycle.import(&RemoteId::from(args.id)).await?;
            state::save(&args.target.state, kind, &imported)?;
            Ok(Summary {
                kind,
                action: "imported".into(),
                id: Some(id_of(&imported)),
            })
        }
    }
}

fn read_desired<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let desired_err = |reason: String| CliError::Desired {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| desired_err(e.to_string()))?;
    toml::from_str(&text).map_err(|e| desired_err(e.to_string()))
}

//! Command implementations for devhost.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, and the [`Session`] every command starts from.

mod certs;
mod check;
mod fpm;
mod hosts;
mod httpd_bin;
mod render;
mod status;
mod stop;
mod up;


use crate::cli::{Cli, Command, GlobalArgs};
use crate::config::{ConfigModel, StackSpec};
use crate::context::ProjectContext;
use crate::error::Result;
use crate::identity::{SystemIdentity, resolve_identity};
use crate::probe::SystemProbe;
use crate::render::RenderContext;
use crate::validate::validate_or_fail;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Command::Check(args) => check::cmd_check(&global, args),
        Command::Render(args) => render::cmd_render(&Session::load(&global)?, args.output),
        Command::Certs => certs::cmd_certs(&Session::load(&global)?),
        Command::Fpm => fpm::cmd_fpm(&Session::load(&global)?),
        Command::Hosts(args) => hosts::cmd_hosts(&Session::load(&global)?, args),
        Command::HttpdBin => httpd_bin::cmd_httpd_bin(&Session::load_unchecked(&global)?),
        Command::Status => status::cmd_status(&Session::load_unchecked(&global)?),
        Command::Stop => stop::cmd_stop(&Session::load_unchecked(&global)?),
        Command::Up(args) => up::cmd_up(&Session::load(&global)?, args),
    }
}

/// A loaded project: paths, parsed model, and its typed views.
pub(crate) struct Session {
    pub ctx: ProjectContext,
    pub model: ConfigModel,
    pub stack: StackSpec,
}

impl Session {
    /// Load and validate. Any problem aborts before a single write.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let session = Self::load_unchecked(global)?;
        validate_or_fail(&session.model, &SystemProbe, &session.ctx.root)?;
        Ok(session)
    }

    /// Load without validation, for read-only commands.
    pub fn load_unchecked(global: &GlobalArgs) -> Result<Self> {
        let ctx = ProjectContext::resolve(global.root.as_deref(), global.config.as_deref())?;
        let model = ConfigModel::load(&ctx.config_path)?;
        Ok(Self::from_model(ctx, model))
    }

    pub fn from_model(ctx: ProjectContext, model: ConfigModel) -> Self {
        let stack = StackSpec::from_model(&model);
        Self { ctx, model, stack }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            root: self.ctx.root.clone(),
            identity: resolve_identity(&self.stack.server, &SystemIdentity),
        }
    }
}

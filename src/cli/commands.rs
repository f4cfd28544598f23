//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::ValidationReport;
use crate::cli::args::{
    Cli, Commands, ConfigCommands, ContextCommands, FieldCommands, MoveDirection, OptionCommands,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::tree_view::{library_tree, TreeRender};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::walker::flatten;
use crate::domain::{DomainError, FieldId, MoveOutcome, NewField, StepId};
use crate::infrastructure::di::{ServiceContainer, Session};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    if let Commands::Tree {
        step: Some(step),
        templates: true,
    } = command
    {
        return Err(CliError::InvalidArgs(format!(
            "--step {} cannot be combined with --templates",
            step
        )));
    }

    let project_dir = project_dir(cli)?;
    let mut settings = Settings::load(Some(project_dir.as_path())).map_err(InfraError::from)?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    debug!("execute_command: store={}", settings.store_path.display());

    if let Commands::Config { command } = command {
        return cmd_config(command, &settings, &project_dir);
    }

    let container = ServiceContainer::new(settings)?;
    let mut session = container.open_session()?;

    match command {
        Commands::Tree { step, templates } => cmd_tree(&session, step.as_ref(), *templates),
        Commands::Flatten { step } => cmd_flatten(&session, step),
        Commands::Ancestors { field } => cmd_ancestors(&session, field),
        Commands::Triggers { field } => cmd_triggers(&session, field),
        Commands::Field { command } => cmd_field(&mut session, command),
        Commands::Options { command } => cmd_option(&mut session, command),
        Commands::Validate { fix } => cmd_validate(&mut session, *fix),
        Commands::Context { command } => cmd_context(&mut session, command),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("get current directory", e))),
    }
}

fn domain_err(e: DomainError) -> CliError {
    CliError::Infra(InfraError::Application(e.into()))
}

fn app_err(e: crate::application::ApplicationError) -> CliError {
    CliError::Infra(InfraError::Application(e))
}

fn report_move(what: &dyn std::fmt::Display, outcome: MoveOutcome) {
    match outcome {
        MoveOutcome::Moved => output::success(&format!("moved {}", what)),
        MoveOutcome::Unchanged => output::info(&format!("{} is already at the boundary", what)),
    }
}

// ============================================================
// Tree queries
// ============================================================

#[instrument(level = "debug", skip(session))]
fn cmd_tree(session: &Session, step: Option<&StepId>, templates: bool) -> CliResult<()> {
    let forest = session.editor.forest();
    if templates {
        output::info(&library_tree(&forest.templates));
        return Ok(());
    }
    match step {
        Some(id) => {
            let step = forest
                .questionnaire
                .step(id)
                .ok_or_else(|| domain_err(DomainError::StepNotFound(id.to_string())))?;
            output::info(&step.to_tree_string());
        }
        None => output::info(&forest.questionnaire.to_tree_string()),
    }
    Ok(())
}

#[instrument(level = "debug", skip(session))]
fn cmd_flatten(session: &Session, step: &StepId) -> CliResult<()> {
    let step = session
        .editor
        .forest()
        .questionnaire
        .step(step)
        .ok_or_else(|| domain_err(DomainError::StepNotFound(step.to_string())))?;
    for field in flatten(&step.children) {
        output::info(&format!("{}\t{}\t{}", field.id, field.kind, field.label));
    }
    Ok(())
}

#[instrument(level = "debug", skip(session))]
fn cmd_ancestors(session: &Session, field: &FieldId) -> CliResult<()> {
    let chain = session.editor.ancestor_chain(field);
    if chain.is_empty() {
        return Err(domain_err(DomainError::FieldNotFound(field.clone())));
    }
    output::info(&chain.iter().join(" > "));
    Ok(())
}

#[instrument(level = "debug", skip(session))]
fn cmd_triggers(session: &Session, field: &FieldId) -> CliResult<()> {
    let candidates = session.editor.eligible_triggers(field).map_err(app_err)?;
    for candidate in candidates {
        output::info(&format!("{}\t{}", candidate.id, candidate.label));
    }
    Ok(())
}

// ============================================================
// Field and option edits
// ============================================================

#[instrument(level = "debug", skip(session))]
fn cmd_field(session: &mut Session, command: &FieldCommands) -> CliResult<()> {
    let editor = &mut session.editor;
    match command {
        FieldCommands::Add {
            parent,
            label,
            kind,
        } => {
            let id = editor
                .add_field(
                    parent,
                    NewField {
                        label: label.clone(),
                        kind: *kind,
                    },
                )
                .map_err(app_err)?;
            output::action("Created", &id);
        }
        FieldCommands::FromTemplate { parent, template } => {
            let id = editor
                .add_field_from_template(parent, template)
                .map_err(app_err)?;
            output::action("Created", &id);
        }
        FieldCommands::Template { label, kind, group } => {
            let id = editor
                .add_template(
                    group.as_ref(),
                    NewField {
                        label: label.clone(),
                        kind: *kind,
                    },
                )
                .map_err(app_err)?;
            output::action("Created template", &id);
        }
        FieldCommands::Delete { id } => {
            editor.delete_field(id).map_err(app_err)?;
            output::action("Deleted", id);
        }
        FieldCommands::Move { id, direction } => {
            let outcome = editor.move_field(id, (*direction).into()).map_err(app_err)?;
            report_move(id, outcome);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(session))]
fn cmd_option(session: &mut Session, command: &OptionCommands) -> CliResult<()> {
    let editor = &mut session.editor;
    let field = match command {
        OptionCommands::Add {
            field,
            label,
            score,
        } => {
            let index = editor.add_option(field).map_err(app_err)?;
            editor.set_option_label(field, index, label.clone()).map_err(app_err)?;
            editor.set_option_score(field, index, *score).map_err(app_err)?;
            output::action("Added option", &index);
            field
        }
        OptionCommands::Delete { field, index } => {
            let removed = editor.delete_option(field, *index).map_err(app_err)?;
            output::action("Deleted option", &removed.label);
            field
        }
        OptionCommands::Move {
            field,
            index,
            direction,
        } => {
            let outcome = editor
                .reorder_option(field, *index, (*direction).into())
                .map_err(app_err)?;
            report_move(&format!("option {}", index), outcome);
            field
        }
        OptionCommands::Trigger {
            field,
            index,
            trigger,
        } => {
            editor
                .set_option_trigger(field, *index, trigger.clone())
                .map_err(app_err)?;
            match trigger {
                Some(t) => output::action("Trigger", t),
                None => output::action("Trigger", &"cleared"),
            }
            field
        }
        OptionCommands::Score {
            field,
            index,
            points,
        } => {
            editor
                .set_option_score(field, *index, *points)
                .map_err(app_err)?;
            field
        }
    };
    editor.save_field(field).map_err(app_err)?;
    output::success_detail(&format!("saved {}", field));
    Ok(())
}

#[instrument(level = "debug", skip(session))]
fn cmd_validate(session: &mut Session, fix: bool) -> CliResult<()> {
    let ValidationReport {
        cleared_triggers,
        order_violations,
    } = session.editor.validate();

    if cleared_triggers.is_empty() && order_violations.is_empty() {
        output::success("tree is consistent");
        return Ok(());
    }
    for cleared in &cleared_triggers {
        output::warning(&format!(
            "field {} option {}: {:?} trigger {}",
            cleared.field, cleared.option_index, cleared.reason, cleared.trigger
        ));
    }
    for violation in &order_violations {
        output::warning(violation);
    }

    if fix {
        for field in cleared_triggers.iter().map(|c| &c.field).unique() {
            session.editor.save_field(field).map_err(app_err)?;
            output::success_detail(&format!("saved {}", field));
        }
    }
    Ok(())
}

// ============================================================
// Contexts
// ============================================================

#[instrument(level = "debug", skip(session))]
fn cmd_context(session: &mut Session, command: &ContextCommands) -> CliResult<()> {
    let service = &mut session.contexts;
    match command {
        ContextCommands::List => {
            for context in service.contexts() {
                output::header(&format!(
                    "[{}] {} ({})",
                    context.presentation_order, context.name, context.id
                ));
                for receiver in &context.receivers {
                    output::detail(receiver);
                }
            }
        }
        ContextCommands::Add { name } => {
            let id = service.add_context(name).map_err(app_err)?;
            output::action("Created", &id);
        }
        ContextCommands::Delete { id } => {
            service.delete_context(id).map_err(app_err)?;
            output::action("Deleted", id);
        }
        ContextCommands::Move { id, direction } => {
            let outcome = match direction {
                MoveDirection::Up => service.move_up(id),
                MoveDirection::Down => service.move_down(id),
            }
            .map_err(app_err)?;
            report_move(id, outcome);
        }
        ContextCommands::Receiver { context, receiver } => {
            let selected = service.toggle_receiver(context, receiver).map_err(app_err)?;
            service.save_context(context).map_err(app_err)?;
            if selected {
                output::diff_add(receiver);
            } else {
                output::diff_remove(receiver);
            }
        }
        ContextCommands::MoveReceiver {
            context,
            index,
            direction,
        } => {
            let outcome = service
                .move_receiver(context, *index, (*direction).into())
                .map_err(app_err)?;
            service.save_context(context).map_err(app_err)?;
            report_move(&format!("receiver {}", index), outcome);
        }
        ContextCommands::Unselected { context } => {
            for receiver in service.unselected_receivers(context).map_err(app_err)? {
                output::info(&format!("{}\t{}", receiver.id, receiver.name));
            }
        }
    }
    Ok(())
}

// ============================================================
// Config
// ============================================================

fn cmd_config(command: &ConfigCommands, settings: &Settings, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let rendered = settings.to_toml().map_err(app_err)?;
            output::info(&rendered);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(project_dir).display());
            output::action("store", &settings.store_path.display());
        }
    }
    Ok(())
}

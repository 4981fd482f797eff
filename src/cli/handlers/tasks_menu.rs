// Interactive task management: add, edit, append commands, downloads, delete.

use anyhow::Result;

use crate::{
    cli::handlers::{commons, menu::select_entry},
    core::store::StoreError,
    models::{Task, TaskField, pick_translation},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskEntry {
    Add,
    EditDescription,
    EditCategory,
    AppendCommand,
    SetDownloadUrl,
    Delete,
    Back,
}

impl TaskEntry {
    const ALL: [Self; 7] = [
        Self::Add,
        Self::EditDescription,
        Self::EditCategory,
        Self::AppendCommand,
        Self::SetDownloadUrl,
        Self::Delete,
        Self::Back,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::EditDescription => "edit_description",
            Self::EditCategory => "edit_category",
            Self::AppendCommand => "append_command",
            Self::SetDownloadUrl => "set_download_url",
            Self::Delete => "delete",
            Self::Back => "back",
        }
    }
}

pub fn show(state: &mut AppState) -> Result<()> {
    loop {
        let Some(entry) = select_entry(state, "tasks", "manage_title", &TaskEntry::ALL, TaskEntry::key)?
        else {
            return Ok(());
        };
        match entry {
            TaskEntry::Back => return Ok(()),
            TaskEntry::Add => add_task(state)?,
            TaskEntry::EditDescription => edit_field(state, TaskField::Description)?,
            TaskEntry::EditCategory => edit_field(state, TaskField::Category)?,
            TaskEntry::AppendCommand => append_command(state)?,
            TaskEntry::SetDownloadUrl => set_download_url(state)?,
            TaskEntry::Delete => delete_task(state)?,
        }
    }
}

fn add_task(state: &mut AppState) -> Result<()> {
    let name = loop {
        let Some(name) = commons::ask_text(state, "tasks", "prompt_name", None)? else {
            return Ok(());
        };
        match state.tasks.create(Task::new(name.as_str())) {
            Ok(()) => break name,
            Err(e @ (StoreError::DuplicateKey { .. } | StoreError::InvalidInput(_))) => {
                commons::print_warning(&e.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    };

    if let Some(description) = commons::ask_text(state, "tasks", "prompt_description", None)? {
        state.update_task_field(&name, TaskField::Description, &description)?;
    }
    if let Some(category) = commons::ask_text(state, "tasks", "prompt_category", None)? {
        state.update_task_field(&name, TaskField::Category, &category)?;
    }
    if let Some(platform) = commons::choose_platform(state)?
        && let Some(command) = commons::ask_text(state, "tasks", "prompt_command", None)?
    {
        state.tasks.append_command(&name, platform, &command)?;
    }

    commons::print_success(&state.tf("tasks", "created", &[("name", name.as_str())]));
    Ok(())
}

fn edit_field(state: &mut AppState, field: TaskField) -> Result<()> {
    let Some(name) = commons::choose_task(state)? else {
        return Ok(());
    };
    let lang = state.language().to_string();
    let current = pick_translation(state.tasks.find(&name)?.field(field), &lang).map(str::to_string);
    let key = match field {
        TaskField::Description => "prompt_description",
        TaskField::Category => "prompt_category",
    };
    let Some(value) = commons::ask_text(state, "tasks", key, current.as_deref())? else {
        return Ok(());
    };
    state.update_task_field(&name, field, &value)?;
    commons::print_success(&state.tf("tasks", "updated", &[("name", name.as_str())]));
    Ok(())
}

fn append_command(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_task(state)? else {
        return Ok(());
    };
    let Some(platform) = commons::choose_platform(state)? else {
        return Ok(());
    };
    let Some(command) = commons::ask_text(state, "tasks", "prompt_command", None)? else {
        return Ok(());
    };
    state.tasks.append_command(&name, platform, &command)?;
    commons::print_success(&state.tf("tasks", "updated", &[("name", name.as_str())]));
    Ok(())
}

fn set_download_url(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_task(state)? else {
        return Ok(());
    };
    let Some(platform) = commons::choose_platform(state)? else {
        return Ok(());
    };
    let current = state
        .tasks
        .find(&name)?
        .download_url(platform)
        .map(str::to_string);
    let prompt = state.t("tasks", "prompt_url");
    let url = state.prompter.input(&prompt, current.as_deref())?;
    let url = url.trim();
    state
        .tasks
        .set_download_url(&name, platform, (!url.is_empty()).then_some(url))?;
    commons::print_success(&state.tf("tasks", "updated", &[("name", name.as_str())]));
    Ok(())
}

fn delete_task(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_task(state)? else {
        return Ok(());
    };
    let referencing: Vec<String> = state
        .profiles
        .referencing(&name)
        .iter()
        .map(|p| p.name.clone())
        .collect();
    if !referencing.is_empty() {
        let profiles = referencing.join(", ");
        commons::print_warning(&state.tf(
            "tasks",
            "referenced_by",
            &[("profiles", profiles.as_str())],
        ));
    }

    let prompt = state.tf("common", "confirm_delete", &[("name", name.as_str())]);
    if !state.prompter.confirm(&prompt, false)? {
        println!("{}", state.t("common", "cancelled"));
        return Ok(());
    }
    if state.tasks.delete(&name)? {
        commons::print_success(&state.tf("tasks", "deleted", &[("name", name.as_str())]));
    }
    Ok(())
}

// Interactive profile management.

use anyhow::Result;

use crate::{
    cli::handlers::{commons, menu::select_entry},
    core::store::StoreError,
    models::{Profile, pick_translation},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileEntry {
    Create,
    EditDescription,
    AddTask,
    RemoveTask,
    Delete,
    Back,
}

impl ProfileEntry {
    const ALL: [Self; 6] = [
        Self::Create,
        Self::EditDescription,
        Self::AddTask,
        Self::RemoveTask,
        Self::Delete,
        Self::Back,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::EditDescription => "edit_description",
            Self::AddTask => "add_task",
            Self::RemoveTask => "remove_task",
            Self::Delete => "delete",
            Self::Back => "back",
        }
    }
}

pub fn show(state: &mut AppState) -> Result<()> {
    loop {
        let Some(entry) = select_entry(
            state,
            "profiles",
            "manage_title",
            &ProfileEntry::ALL,
            ProfileEntry::key,
        )?
        else {
            return Ok(());
        };
        match entry {
            ProfileEntry::Back => return Ok(()),
            ProfileEntry::Create => create_profile(state)?,
            ProfileEntry::EditDescription => edit_description(state)?,
            ProfileEntry::AddTask => {
                if let Some(name) = commons::choose_profile(state)? {
                    add_tasks(state, &name)?;
                }
            }
            ProfileEntry::RemoveTask => remove_task(state)?,
            ProfileEntry::Delete => delete_profile(state)?,
        }
    }
}

fn create_profile(state: &mut AppState) -> Result<()> {
    let lang = state.language().to_string();
    let name = loop {
        let Some(name) = commons::ask_text(state, "profiles", "prompt_name", None)? else {
            return Ok(());
        };
        let description = commons::ask_text(state, "profiles", "prompt_description", None)?
            .unwrap_or_else(|| name.clone());
        let profile = Profile::new(name.as_str()).with_description(&lang, description);
        match state.profiles.create(profile) {
            Ok(()) => break name,
            Err(e @ (StoreError::DuplicateKey { .. } | StoreError::InvalidInput(_))) => {
                commons::print_warning(&e.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    };
    commons::print_success(&state.tf("profiles", "created", &[("name", name.as_str())]));

    let prompt = state.t("profiles", "add_tasks_now");
    if state.prompter.confirm(&prompt, true)? {
        add_tasks(state, &name)?;
    }
    Ok(())
}

fn edit_description(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_profile(state)? else {
        return Ok(());
    };
    let lang = state.language().to_string();
    let current = pick_translation(&state.profiles.find(&name)?.description, &lang)
        .map(str::to_string);
    let Some(text) =
        commons::ask_text(state, "profiles", "prompt_description", current.as_deref())?
    else {
        return Ok(());
    };
    state.profiles.update_description(&name, &lang, &text)?;
    commons::print_success(&state.tf("profiles", "updated", &[("name", name.as_str())]));
    Ok(())
}

/// Adds tasks one at a time until the user backs out. With no tasks defined,
/// names are typed instead; they may be resolved at run time.
fn add_tasks(state: &mut AppState, profile: &str) -> Result<()> {
    loop {
        let task = if state.tasks.is_empty() {
            commons::ask_text(state, "profiles", "prompt_task_name", None)?
        } else {
            commons::choose_task(state)?
        };
        let Some(task) = task else {
            return Ok(());
        };
        state.profiles.add_task_ref(profile, &task)?;
        commons::print_success(&state.tf(
            "profiles",
            "task_added",
            &[("task", task.as_str()), ("name", profile)],
        ));
    }
}

fn remove_task(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_profile(state)? else {
        return Ok(());
    };
    let refs = state.profiles.find(&name)?.tasks.clone();
    if refs.is_empty() {
        commons::print_warning(&state.tf("profiles", "empty", &[("name", name.as_str())]));
        return Ok(());
    }
    let prompt = state.t("profiles", "choose_task_to_remove");
    let Some(task) = state
        .prompter
        .select(&prompt, &refs, 0)?
        .and_then(|i| refs.get(i).cloned())
    else {
        return Ok(());
    };
    if state.profiles.remove_task_ref(&name, &task)? {
        commons::print_success(&state.tf(
            "profiles",
            "task_removed",
            &[("task", task.as_str()), ("name", name.as_str())],
        ));
    }
    Ok(())
}

fn delete_profile(state: &mut AppState) -> Result<()> {
    let Some(name) = commons::choose_profile(state)? else {
        return Ok(());
    };
    let prompt = state.tf("common", "confirm_delete", &[("name", name.as_str())]);
    if !state.prompter.confirm(&prompt, false)? {
        println!("{}", state.t("common", "cancelled"));
        return Ok(());
    }
    if state.profiles.delete(&name)? {
        commons::print_success(&state.tf("profiles", "deleted", &[("name", name.as_str())]));
    }
    Ok(())
}

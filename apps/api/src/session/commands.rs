//! The editor command vocabulary accepted over HTTP, and its dispatch onto
//! an `EditSession`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::autosave::AutosaveEvent;
use crate::catalog::{apply_template, find_template, CatalogError, PresetLibrary};
use crate::editor::blocks::BlockKind;
use crate::editor::commands::{BlockAction, ClickTarget, Clipboard, Format, KeyChord, SlashItem};
use crate::editor::{Caret, EditorEffect, Selection};
use crate::models::document::MetaField;
use crate::session::{EditSession, SessionError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum EditorCommand {
    SetCaret { caret: Caret },
    Select { selection: Selection },
    Type { text: String },
    Enter,
    Key { chord: KeyChord },
    Format { format: Format },
    Slash { item: SlashItem },
    Paste { clipboard: Clipboard },
    Click { target: ClickTarget },
    Action { node: usize, action: BlockAction },
    SetField { node: usize, field: String, value: String },
    CompleteUpload { data_url: String },
    FailUpload,
    InsertBlock { kind: BlockKind },
    InsertKpiBadge { text: String },
    ReplaceSelection { text: String },
    ApplyTemplate { template_id: String },
    CapturePreset { name: String },
    InsertPreset { preset_id: Uuid },
    SetTitle { title: String },
    SetMeta { field: MetaField, value: String },
    SaveNow,
}

impl EditorCommand {
    fn changes_body(&self) -> bool {
        !matches!(
            self,
            EditorCommand::SetCaret { .. }
                | EditorCommand::Select { .. }
                | EditorCommand::CapturePreset { .. }
                | EditorCommand::SetTitle { .. }
                | EditorCommand::SetMeta { .. }
                | EditorCommand::SaveNow
        )
    }
}

/// Applies one command. Returns the effect the client should act on.
pub async fn dispatch(
    session: &mut EditSession,
    presets: &tokio::sync::Mutex<PresetLibrary>,
    command: EditorCommand,
) -> Result<EditorEffect, SessionError> {
    debug!(?command, "editor command");
    let changes_body = command.changes_body();
    let editor = &mut session.editor;
    let effect = match command {
        EditorCommand::SetCaret { caret } => {
            editor.set_caret(caret)?;
            EditorEffect::None
        }
        EditorCommand::Select { selection } => {
            editor.select(selection)?;
            EditorEffect::None
        }
        EditorCommand::Type { text } => editor.type_text(&text)?,
        EditorCommand::Enter => editor.press_enter()?,
        EditorCommand::Key { chord } => editor.key_down(&chord)?,
        EditorCommand::Format { format } => editor.apply_format(format)?,
        EditorCommand::Slash { item } => {
            editor.choose_slash_item(item)?;
            EditorEffect::None
        }
        EditorCommand::Paste { clipboard } => {
            editor.paste(clipboard)?;
            EditorEffect::None
        }
        EditorCommand::Click { target } => editor.click(&target)?,
        EditorCommand::Action { node, action } => editor.apply_action(node, action)?,
        EditorCommand::SetField { node, field, value } => {
            editor.set_field(node, &field, &value)?;
            EditorEffect::None
        }
        EditorCommand::CompleteUpload { data_url } => {
            // A rejected file still consumes the pending target; the status
            // line carries the message.
            if let Err(e) = editor.complete_upload(&data_url) {
                debug!("upload rejected: {e}");
            }
            EditorEffect::None
        }
        EditorCommand::FailUpload => {
            editor.fail_upload();
            EditorEffect::None
        }
        EditorCommand::InsertBlock { kind } => {
            editor.insert_block(kind);
            EditorEffect::None
        }
        EditorCommand::InsertKpiBadge { text } => {
            editor.insert_kpi_badge(&text)?;
            EditorEffect::None
        }
        EditorCommand::ReplaceSelection { text } => {
            editor.replace_selection(&text)?;
            EditorEffect::None
        }
        EditorCommand::ApplyTemplate { template_id } => {
            let template = find_template(&template_id)
                .ok_or(CatalogError::TemplateNotFound(template_id))?;
            apply_template(editor, template);
            EditorEffect::None
        }
        EditorCommand::CapturePreset { name } => {
            presets.lock().await.capture(session.user_id, &name, editor)?;
            EditorEffect::None
        }
        EditorCommand::InsertPreset { preset_id } => {
            presets.lock().await.insert(session.user_id, preset_id, editor)?;
            EditorEffect::None
        }
        EditorCommand::SetTitle { title } => {
            session.send(AutosaveEvent::Title(title)).await?;
            EditorEffect::None
        }
        EditorCommand::SetMeta { field, value } => {
            let mut context = editor.context().clone();
            let slot = match field {
                MetaField::Company => &mut context.company,
                MetaField::Role => &mut context.role,
            };
            *slot = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            editor.set_context(context);
            session.send(AutosaveEvent::Meta(field, value)).await?;
            EditorEffect::None
        }
        EditorCommand::SaveNow => EditorEffect::SaveRequested,
    };

    if changes_body {
        session.push_body().await?;
    }
    if effect == EditorEffect::SaveRequested {
        session.send(AutosaveEvent::SaveNow).await?;
    }
    Ok(effect)
}

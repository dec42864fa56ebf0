use gloo::file::callbacks::{FileReader, read_as_data_url};
use gloo::file::{File, FileReadError};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::util::{clog, cwarn};

#[derive(Properties, PartialEq, Clone)]
pub struct AddDocumentModalProps {
    pub show: bool,
    pub on_close: Callback<()>,
    /// Receives the trimmed, non-empty URL (link or data URL).
    pub on_add: Callback<String>,
}

/// The draft as it will be stored, or `None` when there is nothing to add.
fn confirmed_url(draft: &str) -> Option<String> {
    let trimmed = draft.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[function_component(AddDocumentModal)]
pub fn add_document_modal(props: &AddDocumentModalProps) -> Html {
    let url = use_state(String::new);
    let uploading = use_state(|| false);
    let upload_error = use_state(|| false);
    // dropping the reader aborts the read
    let reader = use_mut_ref(|| None::<FileReader>);
    if !props.show {
        return html! {};
    }

    let submit = {
        let url = url.clone();
        let on_add = props.on_add.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |()| {
            let Some(confirmed) = confirmed_url(&url) else {
                return;
            };
            on_add.emit(confirmed);
            url.set(String::new());
            on_close.emit(());
        })
    };
    let on_input = {
        let url = url.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            url.set(input.value());
        })
    };
    let on_file = {
        let url = url.clone();
        let uploading = uploading.clone();
        let upload_error = upload_error.clone();
        let reader = reader.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|list| list.get(0)) else {
                return;
            };
            // allow picking the same file again
            input.set_value("");
            let file = File::from(file);
            clog(&format!("add document: reading {} ({} bytes)", file.name(), file.size()));
            uploading.set(true);
            upload_error.set(false);
            let url = url.clone();
            let uploading = uploading.clone();
            let upload_error = upload_error.clone();
            let task = read_as_data_url(&file, move |res: Result<String, FileReadError>| {
                match res {
                    Ok(data_url) => url.set(data_url),
                    Err(e) => {
                        cwarn(&format!("add document: file read failed: {e}"));
                        upload_error.set(true);
                    }
                }
                uploading.set(false);
            });
            *reader.borrow_mut() = Some(task);
        })
    };
    let on_key = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit.emit(());
            }
        })
    };
    let on_submit = {
        let submit = submit.clone();
        Callback::from(move |_| submit.emit(()))
    };
    let on_cancel = {
        let url = url.clone();
        let reader = reader.clone();
        let uploading = uploading.clone();
        let cb = props.on_close.clone();
        Callback::from(move |_| {
            reader.borrow_mut().take();
            uploading.set(false);
            url.set(String::new());
            cb.emit(())
        })
    };
    let disabled = *uploading || confirmed_url(&url).is_none();
    let is_data_url = url.starts_with("data:");
    // data URLs are huge; show a placeholder instead of the payload
    let shown = if is_data_url { String::new() } else { (*url).clone() };
    let status = if *uploading {
        html! { <span style="font-size:12px; opacity:0.8;">{"Загрузка..."}</span> }
    } else if *upload_error {
        html! { <span style="font-size:12px; color:#ef4444;">{"Ошибка при загрузке файла"}</span> }
    } else if is_data_url {
        html! { <span style="font-size:12px; color:#22c55e;">{"Файл загружен"}</span> }
    } else {
        html! {}
    };

    html! {
        <div style="position:fixed; inset:0; z-index:100000; background:rgba(0,0,0,0.7); display:flex; align-items:center; justify-content:center;">
            <div style="background:#1c1917; border:2px solid #57534e; border-radius:10px; padding:20px; width:min(440px, 90vw); color:#e7e5e4; display:flex; flex-direction:column; gap:12px;">
                <h3 style="margin:0; font-size:18px;">{"Добавить документ"}</h3>
                <input type="text" placeholder="https://... или data:image/..." value={shown}
                    oninput={on_input} onkeydown={on_key}
                    style="padding:8px; background:#292524; border:1px solid #57534e; border-radius:6px; color:#e7e5e4;" />
                <label style="align-self:flex-start; padding:4px 10px; border:1px solid #57534e; border-radius:6px; background:#292524; cursor:pointer;">
                    {"Загрузить файл"}
                    <input type="file" accept="image/*" onchange={on_file} style="display:none;" />
                </label>
                {status}
                <div style="display:flex; gap:8px; justify-content:flex-end;">
                    <button onclick={on_cancel}>{"Отмена"}</button>
                    <button onclick={on_submit} {disabled}>{"Добавить"}</button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::confirmed_url;

    #[test]
    fn blank_draft_adds_nothing() {
        assert_eq!(confirmed_url("   \n"), None);
    }

    #[test]
    fn link_is_trimmed() {
        assert_eq!(
            confirmed_url("  https://zone.example/map.png "),
            Some("https://zone.example/map.png".to_string())
        );
    }

    #[test]
    fn uploaded_file_data_url_is_kept_verbatim() {
        let data = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";
        assert_eq!(confirmed_url(data).as_deref(), Some(data));
    }
}

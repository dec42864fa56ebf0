pub mod add_document_modal;
pub mod app;
pub mod camera_controls;
pub mod document_folder;
pub mod fullscreen_viewer;
pub mod map_modal;
pub mod map_toolbar;
pub mod marker_note_modal;
pub mod welcome_guide;

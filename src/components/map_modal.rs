use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, WheelEvent};
use yew::prelude::*;

use super::{camera_controls::CameraControls, map_toolbar::MapToolbar, marker_note_modal::MarkerNoteModal};
use crate::model::{NormPoint, ScreenPoint, ScreenRect};
use crate::state::annotation::{
    Ink, MoveEffect, PointerButton, ReleaseEffect, StrokeSegment, ToolKind, marker_icon_scale,
};
use crate::state::viewport::PanDirection;
use crate::state::{AnnotationSurface, Viewport};
use crate::storage::{self, MARKERS_KEY, STROKES_KEY};
use crate::util::{clog, next_id};

#[derive(Properties, PartialEq, Clone)]
pub struct MapModalProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

fn area_rect(area_ref: &NodeRef) -> Option<ScreenRect> {
    let el = area_ref.cast::<Element>()?;
    let rect = ScreenRect::from_dom(&el.get_bounding_client_rect());
    (!rect.is_empty()).then_some(rect)
}

fn context_2d(canvas_ref: &NodeRef) -> Option<CanvasRenderingContext2d> {
    let canvas = canvas_ref.cast::<HtmlCanvasElement>()?;
    canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

// Canvas space is the surface rect moved to the origin.
fn trace(ctx: &CanvasRenderingContext2d, vp: &Viewport, rect: ScreenRect, points: &[NormPoint]) {
    let local = ScreenRect::new(0.0, 0.0, rect.width, rect.height);
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return;
    };
    let start = vp.to_screen(*first, local);
    ctx.begin_path();
    ctx.move_to(start.x, start.y);
    for p in iter {
        let q = vp.to_screen(*p, local);
        ctx.line_to(q.x, q.y);
    }
    ctx.stroke();
}

/// Clears the raster and draws every committed stroke under the current view.
fn repaint(canvas_ref: &NodeRef, area_ref: &NodeRef, surface: &AnnotationSurface) {
    let (Some(canvas), Some(rect)) = (canvas_ref.cast::<HtmlCanvasElement>(), area_rect(area_ref)) else {
        return;
    };
    let (w, h) = (rect.width as u32, rect.height as u32);
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    let Some(ctx) = context_2d(canvas_ref) else {
        return;
    };
    ctx.set_global_composite_operation("source-over").ok();
    ctx.clear_rect(0.0, 0.0, rect.width, rect.height);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    let vp = surface.viewport;
    for s in surface.strokes() {
        ctx.set_stroke_style_str(&s.color);
        ctx.set_line_width(s.width * vp.zoom);
        trace(&ctx, &vp, rect, &s.points);
    }
}

/// Paints one live segment; the eraser punches through the raster.
fn paint_segment(canvas_ref: &NodeRef, area_ref: &NodeRef, vp: &Viewport, seg: &StrokeSegment) {
    let (Some(ctx), Some(rect)) = (context_2d(canvas_ref), area_rect(area_ref)) else {
        return;
    };
    match &seg.ink {
        Ink::Color { color, width } => {
            ctx.set_global_composite_operation("source-over").ok();
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(width * vp.zoom);
        }
        Ink::Erase { width } => {
            ctx.set_global_composite_operation("destination-out").ok();
            ctx.set_stroke_style_str("rgba(0,0,0,1)");
            ctx.set_line_width(width * vp.zoom);
        }
    }
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    trace(&ctx, vp, rect, &[seg.from, seg.to]);
    ctx.set_global_composite_operation("source-over").ok();
}

fn persist_markers(surface: &AnnotationSurface) {
    storage::save(MARKERS_KEY, &surface.markers());
}

fn persist_strokes(surface: &AnnotationSurface) {
    storage::save(STROKES_KEY, &surface.strokes());
}

fn pointer_of(e: &MouseEvent) -> ScreenPoint {
    ScreenPoint::new(e.client_x() as f64, e.client_y() as f64)
}

/// Percent-based placement over the untransformed area: resolves to
/// `pan + p / 100 * size * zoom`, matching the canvas.
fn anchor_style(vp: &Viewport, p: NormPoint) -> String {
    format!(
        "left:calc({}px + {}%); top:calc({}px + {}%);",
        vp.pan_x,
        p.x * vp.zoom,
        vp.pan_y,
        p.y * vp.zoom
    )
}

#[function_component(MapModal)]
pub fn map_modal(props: &MapModalProps) -> Html {
    let surface: Rc<RefCell<AnnotationSurface>> = use_mut_ref(|| {
        AnnotationSurface::new(
            storage::load_list(MARKERS_KEY),
            storage::load_list(STROKES_KEY),
        )
    });
    let canvas_ref = use_node_ref();
    let area_ref = use_node_ref();
    let force = use_force_update();

    // Any render may follow a zoom, pan or stroke-list change.
    {
        let surface = surface.clone();
        let canvas_ref = canvas_ref.clone();
        let area_ref = area_ref.clone();
        use_effect(move || {
            repaint(&canvas_ref, &area_ref, &surface.borrow());
            || ()
        });
    }
    // Wheel needs a non-passive listener so the page does not scroll.
    {
        let surface = surface.clone();
        let area_ref = area_ref.clone();
        let force = force.clone();
        use_effect_with(props.show, move |show| {
            let mut listener = None;
            if *show {
                if let Some(el) = area_ref.cast::<Element>() {
                    listener = Some(EventListener::new_with_options(
                        &el,
                        "wheel",
                        EventListenerOptions::enable_prevent_default(),
                        move |event: &Event| {
                            let Some(e) = event.dyn_ref::<WheelEvent>() else {
                                return;
                            };
                            e.prevent_default();
                            if surface.borrow_mut().wheel(e.delta_y()) {
                                force.force_update();
                            }
                        },
                    ));
                }
            }
            move || drop(listener)
        });
    }

    if !props.show {
        return html! {};
    }

    let on_mouse_down = {
        let surface = surface.clone();
        let area_ref = area_ref.clone();
        let force = force.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(rect) = area_rect(&area_ref) else {
                return;
            };
            let button = PointerButton::from_dom(e.button());
            if surface.borrow_mut().pointer_down(pointer_of(&e), button, rect) {
                e.prevent_default();
                force.force_update();
            }
        })
    };
    let on_mouse_move = {
        let surface = surface.clone();
        let canvas_ref = canvas_ref.clone();
        let area_ref = area_ref.clone();
        let force = force.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(rect) = area_rect(&area_ref) else {
                return;
            };
            let effect = surface.borrow_mut().pointer_move(pointer_of(&e), rect);
            match effect {
                MoveEffect::None => {}
                MoveEffect::Panned => force.force_update(),
                MoveEffect::Segment(seg) => {
                    let vp = surface.borrow().viewport;
                    paint_segment(&canvas_ref, &area_ref, &vp, &seg);
                }
            }
        })
    };
    // mouseleave ends the gesture the same way mouseup does
    let on_mouse_up = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |_: MouseEvent| {
            let effect = surface.borrow_mut().pointer_up(|| next_id("path"));
            match &effect {
                ReleaseEffect::None => return,
                ReleaseEffect::StrokeAdded { id } => clog(&format!("map: stroke {id} added")),
                ReleaseEffect::Erased { removed } if *removed > 0 => {
                    clog(&format!("map: erased {removed} stroke(s)"))
                }
                _ => {}
            }
            if effect.paths_changed() {
                persist_strokes(&surface.borrow());
            }
            if effect.needs_repaint() || effect == ReleaseEffect::PanEnded {
                force.force_update();
            }
        })
    };
    let on_click = {
        let surface = surface.clone();
        let area_ref = area_ref.clone();
        let force = force.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(rect) = area_rect(&area_ref) else {
                return;
            };
            let placed = surface
                .borrow_mut()
                .map_click(pointer_of(&e), rect, || next_id("marker"));
            if let Some(id) = placed {
                clog(&format!("map: marker {id} placed"));
                persist_markers(&surface.borrow());
                force.force_update();
            }
        })
    };
    let on_context_menu = Callback::from(|e: MouseEvent| e.prevent_default());

    let view_action = |f: fn(&mut AnnotationSurface)| {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |()| {
            f(&mut surface.borrow_mut());
            force.force_update();
        })
    };
    let on_pan = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |dir: PanDirection| {
            surface.borrow_mut().pan_step(dir);
            force.force_update();
        })
    };
    let on_tool = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |kind: ToolKind| {
            surface.borrow_mut().toggle_tool(kind);
            force.force_update();
        })
    };
    let on_pen_color = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |c: String| {
            surface.borrow_mut().set_pen_color(&c);
            force.force_update();
        })
    };
    let on_pen_width = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |w: f64| {
            surface.borrow_mut().set_pen_width(w);
            force.force_update();
        })
    };
    let on_eraser_width = {
        let surface = surface.clone();
        let force = force.clone();
        Callback::from(move |w: f64| {
            surface.borrow_mut().set_eraser_width(w);
            force.force_update();
        })
    };

    let s = surface.borrow();
    let vp = s.viewport;
    let size = s.marker_size_px();
    let icon_scale = marker_icon_scale(vp.zoom);

    let markers = s
        .markers()
        .iter()
        .map(|m| {
            let (bg, border, fg) = m.kind.colors();
            let open_editor = {
                let surface = surface.clone();
                let force = force.clone();
                let id = m.id.clone();
                Callback::from(move |e: MouseEvent| {
                    e.stop_propagation();
                    if surface.borrow_mut().open_note_editor(&id).is_some() {
                        force.force_update();
                    }
                })
            };
            let delete = {
                let surface = surface.clone();
                let force = force.clone();
                let id = m.id.clone();
                Callback::from(move |e: MouseEvent| {
                    e.stop_propagation();
                    if surface.borrow_mut().delete_marker(&id) {
                        persist_markers(&surface.borrow());
                        force.force_update();
                    }
                })
            };
            let stop = Callback::from(|e: MouseEvent| e.stop_propagation());
            let style = format!(
                "position:absolute; {} width:{size}px; height:{size}px; transform:translate(-50%,-50%); border-radius:50%; border:2px solid {border}; background:{bg}; color:{fg}; display:flex; align-items:center; justify-content:center; cursor:pointer; box-shadow:0 2px 6px rgba(0,0,0,0.5); z-index:5;",
                anchor_style(&vp, m.position())
            );
            html! {
                <div key={m.id.clone()} class="map-marker" {style} title={m.kind.label()}
                    onmousedown={stop} onclick={open_editor}>
                    <span style={format!("transform:scale({icon_scale}); font-size:20px;")}>{m.kind.glyph()}</span>
                    if !m.note.is_empty() {
                        <span style="position:absolute; top:-4px; right:-4px; width:12px; height:12px; border-radius:50%; background:#22c55e; color:#fff; font-size:8px; font-weight:bold; display:flex; align-items:center; justify-content:center;">{"!"}</span>
                    }
                    <button class="marker-delete" onclick={delete}
                        style="position:absolute; top:-8px; left:-8px; width:16px; height:16px; padding:0; border:none; border-radius:50%; background:#ef4444; color:#fff; font-size:10px; cursor:pointer;">{"✕"}</button>
                </div>
            }
        })
        .collect::<Html>();

    let path_buttons = s
        .strokes()
        .iter()
        .filter_map(|st| {
            let first = *st.points.first()?;
            let delete = {
                let surface = surface.clone();
                let force = force.clone();
                let id = st.id.clone();
                Callback::from(move |e: MouseEvent| {
                    e.stop_propagation();
                    if surface.borrow_mut().delete_path(&id) {
                        persist_strokes(&surface.borrow());
                        force.force_update();
                    }
                })
            };
            let stop = Callback::from(|e: MouseEvent| e.stop_propagation());
            let style = format!(
                "position:absolute; {} width:20px; height:20px; padding:0; transform:translate(-50%,-50%); border:none; border-radius:50%; background:#ef4444; color:#fff; font-size:11px; opacity:0.5; cursor:pointer; z-index:4;",
                anchor_style(&vp, first)
            );
            Some(html! {
                <button key={st.id.clone()} {style} onmousedown={stop} onclick={delete} title="Удалить линию">{"✕"}</button>
            })
        })
        .collect::<Html>();

    let editor = match s.editing_marker() {
        Some(marker) => {
            let id = marker.id.clone();
            let on_save = {
                let surface = surface.clone();
                let force = force.clone();
                let id = id.clone();
                Callback::from(move |text: String| {
                    if surface.borrow_mut().edit_marker_note(&id, &text) {
                        persist_markers(&surface.borrow());
                    }
                    force.force_update();
                })
            };
            let on_delete = {
                let surface = surface.clone();
                let force = force.clone();
                let id = id.clone();
                Callback::from(move |()| {
                    if surface.borrow_mut().delete_marker(&id) {
                        persist_markers(&surface.borrow());
                    }
                    force.force_update();
                })
            };
            let on_close = {
                let surface = surface.clone();
                let force = force.clone();
                Callback::from(move |()| {
                    surface.borrow_mut().close_note_editor();
                    force.force_update();
                })
            };
            html! { <MarkerNoteModal marker={marker.clone()} {on_save} {on_delete} {on_close} /> }
        }
        None => html! {},
    };

    let cursor = match s.tool_kind() {
        Some(ToolKind::Eraser) => "cell",
        Some(_) => "crosshair",
        None if s.is_panning() => "grabbing",
        None => "grab",
    };
    let transition = if s.is_panning() || s.is_stroking() {
        "none"
    } else {
        "transform 0.2s ease-out"
    };
    let map_style = format!(
        "position:absolute; left:0; top:0; width:100%; height:100%; background:url(assets/map.bmp) center/cover no-repeat; transform-origin:0 0; transform:translate({}px, {}px) scale({}); transition:{transition}; pointer-events:none;",
        vp.pan_x, vp.pan_y, vp.zoom
    );

    html! {
        <div style="position:fixed; inset:0; z-index:100005; background:rgba(0,0,0,0.92); display:flex; flex-direction:column;">
            <MapToolbar
                active={s.tool_kind()}
                pen_color={s.pen_color().to_string()}
                pen_width={s.pen_width()}
                eraser_width={s.eraser_width()}
                {on_tool}
                {on_pen_color}
                {on_pen_width}
                {on_eraser_width}
                on_close={props.on_close.clone()}
            />
            <div style="position:relative; flex:1; display:flex; align-items:center; justify-content:center; overflow:hidden;">
                <div ref={area_ref.clone()}
                    style={format!("position:relative; width:90vw; height:80vh; overflow:hidden; cursor:{cursor}; user-select:none;")}
                    onmousedown={on_mouse_down}
                    onmousemove={on_mouse_move}
                    onmouseup={on_mouse_up.clone()}
                    onmouseleave={on_mouse_up}
                    onclick={on_click}
                    oncontextmenu={on_context_menu}>
                    <div style={map_style}></div>
                    <canvas ref={canvas_ref.clone()} style="position:absolute; inset:0; width:100%; height:100%; pointer-events:none;"></canvas>
                    {path_buttons}
                    {markers}
                </div>
                <CameraControls
                    zoom_percent={vp.zoom_percent()}
                    scale_meters={vp.scale_meters()}
                    on_zoom_in={view_action(|s| { s.zoom_in(); })}
                    on_zoom_out={view_action(|s| { s.zoom_out(); })}
                    on_reset={view_action(AnnotationSurface::reset_view)}
                    {on_pan}
                />
                {editor}
            </div>
        </div>
    }
}

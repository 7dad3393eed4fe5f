mod canvas;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use canvas::CanvasSurface;
use robot_core::{render, Event, Schedule, Simulation};
use robot_shared::{SimulationSettings, StatusSnapshot};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

const TITLE: &str = "Warehouse Robot Simulation";

type Callback = RefCell<Option<Closure<dyn FnMut()>>>;

/// Ids of everything the browser may still call back into.
#[derive(Default)]
struct Handles {
    frame: Option<i32>,
    move_timer: Option<i32>,
    pause_timer: Option<i32>,
}

/// Mounted widget: simulation state plus the animation frame and the two
/// duty cycle timers driving it.
struct Widget {
    window: Window,
    sim: RefCell<Simulation>,
    context: Option<CanvasRenderingContext2d>,
    status: Option<Element>,
    handles: RefCell<Handles>,
    on_frame: Callback,
    on_move: Callback,
    on_pause: Callback,
}

impl Widget {
    fn install_callbacks(self: &Rc<Self>) {
        *self.on_frame.borrow_mut() = Some(Self::callback(Rc::downgrade(self), Widget::frame));
        *self.on_move.borrow_mut() = Some(Self::callback(Rc::downgrade(self), |w| {
            w.timer(Event::MoveElapsed)
        }));
        *self.on_pause.borrow_mut() = Some(Self::callback(Rc::downgrade(self), |w| {
            w.timer(Event::PauseElapsed)
        }));
    }

    fn callback(widget: Weak<Self>, f: fn(&Widget)) -> Closure<dyn FnMut()> {
        Closure::wrap(Box::new(move || {
            if let Some(widget) = widget.upgrade() {
                f(&widget);
            }
        }) as Box<dyn FnMut()>)
    }

    fn mount(&self) {
        if self.handles.borrow().frame.is_some() {
            return;
        }
        let schedule = self.sim.borrow().start();
        self.apply(schedule);
        self.redraw();
        self.request_frame();
    }

    fn frame(&self) {
        self.handles.borrow_mut().frame = None;
        let schedule = self.sim.borrow_mut().handle(Event::Frame);
        self.apply(schedule);
        self.redraw();
        self.request_frame();
    }

    fn timer(&self, event: Event) {
        {
            let mut handles = self.handles.borrow_mut();
            match event {
                Event::MoveElapsed => handles.move_timer = None,
                Event::PauseElapsed => handles.pause_timer = None,
                Event::Frame => {}
            }
        }
        let schedule = self.sim.borrow_mut().handle(event);
        self.apply(schedule);
        self.redraw();
    }

    fn apply(&self, schedule: Schedule) {
        match schedule {
            Schedule::None => {}
            Schedule::MoveTimer { ms } => {
                let id = self.set_timeout(&self.on_move, ms);
                self.handles.borrow_mut().move_timer = id;
            }
            Schedule::PauseTimer { ms } => {
                let id = self.set_timeout(&self.on_pause, ms);
                self.handles.borrow_mut().pause_timer = id;
            }
        }
    }

    fn set_timeout(&self, callback: &Callback, ms: u32) -> Option<i32> {
        let callback = callback.borrow();
        let function = callback.as_ref()?.as_ref().unchecked_ref::<js_sys::Function>();
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(function, ms as i32)
            .ok()
    }

    fn request_frame(&self) {
        if self.sim.borrow().is_disposed() {
            return;
        }
        let callback = self.on_frame.borrow();
        if let Some(callback) = callback.as_ref() {
            let id = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .ok();
            self.handles.borrow_mut().frame = id;
        }
    }

    fn redraw(&self) {
        let sim = self.sim.borrow();
        let mut surface = self.context.as_ref().map(CanvasSurface::new);
        render::render_if_available(&sim, surface.as_mut());

        if let Some(status) = &self.status {
            status.set_inner_html(&status_html(&StatusSnapshot::from(&*sim)));
        }
    }

    fn teardown(&self) {
        let handles = std::mem::take(&mut *self.handles.borrow_mut());
        if let Some(id) = handles.frame {
            self.window.cancel_animation_frame(id).ok();
        }
        if let Some(id) = handles.move_timer {
            self.window.clear_timeout_with_handle(id);
        }
        if let Some(id) = handles.pause_timer {
            self.window.clear_timeout_with_handle(id);
        }

        self.sim.borrow_mut().shutdown();
        self.on_frame.borrow_mut().take();
        self.on_move.borrow_mut().take();
        self.on_pause.borrow_mut().take();
    }
}

fn status_html(status: &StatusSnapshot) -> String {
    format!(
        "<h1>{}</h1><p>{}</p><p>{}</p>",
        TITLE,
        status.status_line(),
        status.position_line()
    )
}

#[wasm_bindgen]
pub struct RobotSimulation {
    widget: Rc<Widget>,
}

#[wasm_bindgen]
impl RobotSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, status_id: Option<String>) -> Result<RobotSimulation, JsValue> {
        Self::with_settings(canvas_id, status_id, &SimulationSettings::default())
    }

    /// Builds the widget from JSON settings; omitted fields use defaults.
    pub fn with_settings_json(
        canvas_id: &str,
        status_id: Option<String>,
        json: &str,
    ) -> Result<RobotSimulation, JsValue> {
        let settings =
            SimulationSettings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::with_settings(canvas_id, status_id, &settings)
    }

    /// Arms the first move timer and starts the animation loop.
    pub fn start(&self) {
        self.widget.mount();
    }

    /// Cancels the animation frame and both timers. The widget stays
    /// readable but never changes again.
    pub fn destroy(&self) {
        self.widget.teardown();
        console_log!("Robot simulation stopped");
    }

    pub fn render(&self) {
        self.widget.redraw();
    }

    pub fn is_moving(&self) -> bool {
        self.widget.sim.borrow().state().is_moving()
    }

    pub fn position_x(&self) -> f32 {
        self.widget.sim.borrow().position().x
    }

    pub fn position_y(&self) -> f32 {
        self.widget.sim.borrow().position().y
    }

    pub fn path_len(&self) -> usize {
        self.widget.sim.borrow().path().len()
    }

    pub fn status_text(&self) -> String {
        StatusSnapshot::from(&*self.widget.sim.borrow()).to_string()
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        let status = StatusSnapshot::from(&*self.widget.sim.borrow());
        serde_json::to_string(&status).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl RobotSimulation {
    fn with_settings(
        canvas_id: &str,
        status_id: Option<String>,
        settings: &SimulationSettings,
    ) -> Result<RobotSimulation, JsValue> {
        let config = settings
            .to_config()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        canvas.set_width(config.size as u32);
        canvas.set_height(config.size as u32);

        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        if context.is_none() {
            console_log!("No 2d context on #{}, frames will be skipped", canvas_id);
        }

        let status = status_id.and_then(|id| document.get_element_by_id(&id));

        console_log!(
            "Initializing robot simulation on a {}x{} surface",
            config.size,
            config.size
        );

        let widget = Rc::new(Widget {
            window,
            sim: RefCell::new(Simulation::new(config)),
            context,
            status,
            handles: RefCell::new(Handles::default()),
            on_frame: RefCell::new(None),
            on_move: RefCell::new(None),
            on_pause: RefCell::new(None),
        });
        widget.install_callbacks();

        Ok(RobotSimulation { widget })
    }
}

impl Drop for RobotSimulation {
    fn drop(&mut self) {
        self.widget.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_core::SimConfig;

    #[test]
    fn test_status_html() {
        let sim = Simulation::new(SimConfig::default());
        let html = status_html(&StatusSnapshot::from(&sim));
        assert_eq!(
            html,
            "<h1>Warehouse Robot Simulation</h1>\
             <p>Robot Status: Moving</p>\
             <p>Position: (0.0m, 0.0m)</p>"
        );
    }
}

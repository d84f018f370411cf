use anyhow::{Context, Result};
use confetti_cannon::{clock::Pacing, config::Config};
use log::{debug, error};
use pollster::FutureExt as _;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod app;

use app::App;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title(&config.window.title)
        .with_inner_size(LogicalSize::<u32> {
            width: config.window.width,
            height: config.window.height,
        })
        .build(&event_loop)
        .context("Failed to build window")?;

    let mut app = App::new(window, config).block_on()?;

    event_loop.run(move |e, _, control_flow| {
        match e {
            Event::WindowEvent { event, window_id } if window_id == app.window().id() => {
                match event {
                    WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(size) => app.on_resize(size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        app.on_resize(*new_inner_size)
                    }
                    WindowEvent::CursorMoved { position, .. } => app.on_cursor_moved(position),
                    WindowEvent::MouseInput {
                        state: ElementState::Released,
                        button: MouseButton::Left,
                        ..
                    } => app.on_mouse_up(),
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Released,
                                virtual_keycode: Some(keycode),
                                ..
                            },
                        ..
                    } => {
                        debug!("Key released: {:?}", keycode);
                        if keycode == winit::event::VirtualKeyCode::Escape {
                            *control_flow = ControlFlow::Exit;
                        } else {
                            app.on_key_up(keycode);
                        }
                    }
                    _ => (),
                }
            }
            Event::MainEventsCleared => match app.update() {
                Ok(Pacing::Tick) => *control_flow = ControlFlow::Poll,
                Ok(Pacing::WaitUntil(deadline)) => {
                    *control_flow = ControlFlow::WaitUntil(deadline)
                }
                Err(e) => {
                    error!("{:?}", e);
                    *control_flow = ControlFlow::Exit;
                }
            },
            _ => (),
        }
    });
}

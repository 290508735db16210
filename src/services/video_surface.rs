// ============================================================================
// VIDEO SURFACE - <video> + <canvas> del navegador para StreamCapture
// ============================================================================

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, HtmlImageElement,
    HtmlVideoElement, ImageData, MediaStream, MediaStreamTrack,
};
use crate::config::FrameEncoding;
use crate::dom::{append_child, create_element, next_event, ElementBuilder};
use crate::error::{describe_js, ScannerError, ScannerResult};
use crate::services::stream_capture::CaptureSurface;

pub const STREAM_CAPTURE_CLASS: &str = "stream-capture";

/// Frame capturado: buffer crudo o imagen PNG ya decodificada
#[derive(Clone, Debug)]
pub enum CapturedFrame {
    Pixels(ImageData),
    Image(HtmlImageElement),
}

impl CapturedFrame {
    /// Valor aceptado por BarcodeDetector.detect()
    pub fn as_js(&self) -> &JsValue {
        match self {
            CapturedFrame::Pixels(data) => data.as_ref(),
            CapturedFrame::Image(image) => image.as_ref(),
        }
    }
}

/// Espera la promesa de `video.play()`; un rechazo (autoplay bloqueado,
/// stream cortado) solo se registra. Devuelve si la reproducción arrancó.
pub async fn settle_playback(play: Result<Promise, JsValue>) -> bool {
    let result = match play {
        Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️ [CAPTURE] video.play() rechazado: {}", describe_js(&e));
            false
        }
    }
}

pub struct VideoCanvasSurface {
    host: Element,
    video: Option<HtmlVideoElement>,
    canvas: Option<HtmlCanvasElement>,
    ctx: Option<CanvasRenderingContext2d>,
    playing: Option<oneshot::Receiver<Event>>,
}

impl VideoCanvasSurface {
    pub fn new() -> Result<Self, JsValue> {
        let host = ElementBuilder::new("div")?
            .class(STREAM_CAPTURE_CLASS)
            .build();
        Ok(Self {
            host,
            video: None,
            canvas: None,
            ctx: None,
            playing: None,
        })
    }

    /// Contenedor donde vive el canvas (se añade al body)
    pub fn host(&self) -> &Element {
        &self.host
    }

    fn init_elements_if_necessary(&mut self) -> ScannerResult<()> {
        if self.canvas.is_none() {
            let canvas = create_element("canvas")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| ScannerError::Dom("canvas is not an HtmlCanvasElement".into()))?;
            let ctx = canvas
                .get_context("2d")?
                .ok_or(ScannerError::CanvasContext)?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| ScannerError::CanvasContext)?;
            append_child(&self.host, &canvas)?;
            self.canvas = Some(canvas);
            self.ctx = Some(ctx);
        }

        if self.video.is_none() {
            let video = create_element("video")?
                .dyn_into::<HtmlVideoElement>()
                .map_err(|_| ScannerError::Dom("video is not an HtmlVideoElement".into()))?;
            // iOS no reproduce inline sin este atributo
            video.set_attribute("playsinline", "")?;
            self.video = Some(video);
        }
        Ok(())
    }
}

impl CaptureSurface for VideoCanvasSurface {
    type Stream = MediaStream;
    type Frame = CapturedFrame;

    fn attach(&mut self, stream: &MediaStream) -> ScannerResult<()> {
        self.init_elements_if_necessary()?;
        let video = self.video.as_ref().ok_or(ScannerError::CaptureUnavailable)?;

        self.playing = Some(next_event(video, "playing")?);

        video.set_muted(true);
        video.set_src_object(Some(stream));
        wasm_bindgen_futures::spawn_local(settle_playback(video.play()).map(|_| ()));
        Ok(())
    }

    fn playing(&mut self) -> LocalBoxFuture<'static, ()> {
        let rx = self.playing.take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
        }
        .boxed_local()
    }

    fn video_size(&self) -> (u32, u32) {
        self.video
            .as_ref()
            .map(|v| (v.video_width(), v.video_height()))
            .unwrap_or((0, 0))
    }

    fn configure(&mut self, width: u32, height: u32, flipped: bool) {
        let (Some(canvas), Some(ctx)) = (self.canvas.as_ref(), self.ctx.as_ref()) else {
            return;
        };
        canvas.set_width(width);
        canvas.set_height(height);

        // Espejo horizontal si la cámara apunta al usuario
        if flipped {
            let half = width as f64 * 0.5;
            let result = ctx
                .translate(half, 0.0)
                .and_then(|_| ctx.scale(-1.0, 1.0))
                .and_then(|_| ctx.translate(-half, 0.0));
            if let Err(e) = result {
                log::warn!("⚠️ [CAPTURE] No se pudo espejar el canvas: {:?}", e);
            }
        }
    }

    fn draw(&mut self, scale: f64) {
        let (Some(video), Some(ctx)) = (self.video.as_ref(), self.ctx.as_ref()) else {
            return;
        };
        let width = video.video_width() as f64 * scale;
        let height = video.video_height() as f64 * scale;
        if let Err(e) =
            ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, width, height)
        {
            log::debug!("🎞️ [CAPTURE] drawImage falló: {:?}", e);
        }
    }

    fn read_frame(&self, encoding: FrameEncoding) -> LocalBoxFuture<'static, ScannerResult<CapturedFrame>> {
        let (Some(canvas), Some(ctx)) = (self.canvas.clone(), self.ctx.clone()) else {
            return futures::future::ready(Err(ScannerError::CaptureUnavailable)).boxed_local();
        };

        match encoding {
            FrameEncoding::Pixels => {
                let frame = ctx
                    .get_image_data(0.0, 0.0, canvas.width() as f64, canvas.height() as f64)
                    .map(CapturedFrame::Pixels)
                    .map_err(ScannerError::from);
                futures::future::ready(frame).boxed_local()
            }
            FrameEncoding::Png => async move {
                let url = canvas.to_data_url_with_type("image/png")?;
                let image = HtmlImageElement::new()?;
                image.set_src(&url);
                JsFuture::from(image.decode()).await?;
                Ok(CapturedFrame::Image(image))
            }
            .boxed_local(),
        }
    }

    fn release(&mut self, stream: MediaStream) {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        if let (Some(canvas), Some(ctx)) = (self.canvas.take(), self.ctx.take()) {
            ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
            canvas.remove();
        }
        if let Some(video) = self.video.take() {
            video.set_src_object(None);
        }
        self.playing = None;
    }
}

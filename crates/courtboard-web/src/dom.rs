use courtboard::{SurfaceProvider, SurfaceRect};

/// The court element, looked up by id on every query so a remounted
/// element is picked up without re-initializing the board.
pub struct DomSurface {
    element_id: String,
}

impl DomSurface {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }
}

impl SurfaceProvider for DomSurface {
    fn surface_rect(&self) -> Option<SurfaceRect> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(&self.element_id)?;
        let rect = element.get_bounding_client_rect();
        Some(SurfaceRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }
}

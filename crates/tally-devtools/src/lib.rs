use web_time::Instant;

use tally_core::{Frame, Role, Scene, SceneNode};

pub struct Hud {
    pub inspector_enabled: bool,
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            inspector_enabled: false,
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_enabled = !self.inspector_enabled;
        log::info!(
            "inspector {}",
            if self.inspector_enabled { "on" } else { "off" }
        );
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Counts the frame and, when enabled, appends the statistics line.
    pub fn overlay(&mut self, scene: &mut Scene) {
        self.frame_count += 1;
        let now = Instant::now();
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                let a = 0.2;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * self.fps_smooth + a * fps
                };
            }
        }
        if !self.inspector_enabled {
            return;
        }

        let mut parts = vec![
            format!("frame: {}", self.frame_count),
            format!("fps: {:.1}", self.fps_smooth),
        ];
        if let Some(m) = &self.metrics {
            parts.push(format!("build+layout: {:.2} ms", m.build_layout_ms));
            parts.push(format!("passes: {}", m.passes));
            parts.push(format!("nodes: {}", m.scene_nodes));
            parts.push(format!("interactive: {}", m.hit_regions));
        }
        scene.nodes.push(SceneNode::Overlay {
            text: parts.join("  |  "),
        });
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub build_layout_ms: f32,
    pub scene_nodes: usize,
    pub passes: usize,
    pub hit_regions: usize,
}

impl Metrics {
    pub fn from_frame(frame: &Frame, build_layout_ms: f32) -> Self {
        Self {
            build_layout_ms,
            scene_nodes: frame.scene.nodes.len(),
            passes: frame.passes,
            hit_regions: frame.hit_regions.len(),
        }
    }
}

pub struct Inspector {
    pub hud: Hud,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self { hud: Hud::new() }
    }

    /// Records metrics for a freshly composed frame and decorates its scene.
    pub fn frame(&mut self, frame: &mut Frame, build_layout_ms: f32) {
        self.hud.metrics = Some(Metrics::from_frame(frame, build_layout_ms));
        self.hud.overlay(&mut frame.scene);
    }

    /// One line per semantics node: id, role, label, key and tag.
    pub fn describe(frame: &Frame) -> String {
        let mut out = String::new();
        for n in &frame.semantics_nodes {
            if n.role == Role::Container {
                continue;
            }
            out.push_str(&format!("#{} {:?}", n.id, n.role));
            if let Some(label) = &n.label {
                out.push_str(&format!(" \"{label}\""));
            }
            if let Some(key) = &n.key {
                out.push_str(&format!(" key={key}"));
            }
            if let Some(tag) = &n.test_tag {
                out.push_str(&format!(" [{tag}]"));
            }
            if n.focused() {
                out.push_str(" (focused)");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{SemNode, SemanticsFlags};

    fn frame_with(nodes: Vec<SemNode>) -> Frame {
        Frame {
            scene: Scene::default(),
            hit_regions: vec![],
            semantics_nodes: nodes,
            focus_chain: vec![],
            title: None,
            passes: 1,
        }
    }

    #[test]
    fn overlay_only_when_enabled() {
        let mut inspector = Inspector::new();
        let mut frame = frame_with(vec![]);
        inspector.frame(&mut frame, 0.5);
        assert!(frame.scene.nodes.is_empty());
        assert_eq!(inspector.hud.frame_count(), 1);

        inspector.hud.toggle_inspector();
        inspector.frame(&mut frame, 0.5);
        match frame.scene.nodes.last() {
            Some(SceneNode::Overlay { text }) => {
                assert!(text.starts_with("frame: 2"));
                assert!(text.contains("passes: 1"));
            }
            other => panic!("expected overlay, got {other:?}"),
        }
    }

    #[test]
    fn describe_skips_containers() {
        let node = |id, role, label: Option<&str>| SemNode {
            id,
            role,
            label: label.map(str::to_string),
            value: None,
            test_tag: None,
            key: None,
            flags: SemanticsFlags::ENABLED,
        };
        let frame = frame_with(vec![
            node(1, Role::Container, None),
            node(2, Role::Button, Some("Clicked 0")),
            SemNode {
                key: Some("li-0".into()),
                ..node(3, Role::ListItem, Some("a"))
            },
        ]);
        assert_eq!(
            Inspector::describe(&frame),
            "#2 Button \"Clicked 0\"\n#3 ListItem \"a\" key=li-0\n"
        );
    }
}

use crate::models::config::OcrServerConfig;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, warn};

/// Boxes overlapping more than this are treated as duplicate detections
const NMS_IOU_THRESHOLD: f64 = 0.3;

/// HTTP client for the OCR server that turns a tooltip screenshot into text
#[derive(Clone)]
pub struct HttpOcrClient {
    client: reqwest::Client,
    base_url: String,
    min_confidence: f64,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

/// Single text box with its four corner points
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TextBox {
    #[serde(rename = "box")]
    pub bbox: Vec<Vec<f64>>,
    pub text: String,
    pub score: f64,
}

#[derive(Deserialize)]
struct OcrResponse {
    boxes: Vec<TextBox>,
}

impl TextBox {
    fn is_well_formed(&self) -> bool {
        !self.bbox.is_empty() && self.bbox.iter().all(|point| point.len() >= 2)
    }

    /// (x_min, y_min, x_max, y_max)
    fn rect(&self) -> (f64, f64, f64, f64) {
        self.bbox.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x_min, y_min, x_max, y_max), point| {
                (
                    x_min.min(point[0]),
                    y_min.min(point[1]),
                    x_max.max(point[0]),
                    y_max.max(point[1]),
                )
            },
        )
    }

    fn area(&self) -> f64 {
        let (x_min, y_min, x_max, y_max) = self.rect();
        (x_max - x_min) * (y_max - y_min)
    }

    fn left_x(&self) -> f64 {
        self.rect().0
    }

    fn center_y(&self) -> f64 {
        let (_, y_min, _, y_max) = self.rect();
        (y_min + y_max) / 2.0
    }

    /// Intersection over union of the two bounding rectangles
    fn iou(&self, other: &TextBox) -> f64 {
        let (ax_min, ay_min, ax_max, ay_max) = self.rect();
        let (bx_min, by_min, bx_max, by_max) = other.rect();

        let inter_w = ax_max.min(bx_max) - ax_min.max(bx_min);
        let inter_h = ay_max.min(by_max) - ay_min.max(by_min);
        if inter_w <= 0.0 || inter_h <= 0.0 {
            return 0.0;
        }

        let inter = inter_w * inter_h;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

fn by_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Drop overlapping boxes, keeping the larger one of each overlapping pair
fn filter_overlapping_boxes(mut boxes: Vec<TextBox>, iou_threshold: f64) -> Vec<TextBox> {
    boxes.sort_by(|a, b| by_f64(b.area(), a.area()));

    let mut kept: Vec<TextBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if kept.iter().all(|existing| existing.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}

/// Group boxes into text rows by vertical-centre overlap
fn group_rows(mut boxes: Vec<TextBox>) -> Vec<Vec<TextBox>> {
    boxes.sort_by(|a, b| by_f64(a.center_y(), b.center_y()));

    let mut rows: Vec<(f64, f64, Vec<TextBox>)> = Vec::new();
    for text_box in boxes {
        let (_, y_min, _, y_max) = text_box.rect();
        let center = text_box.center_y();

        match rows.last_mut() {
            Some((top, bottom, row)) if center >= *top && center <= *bottom => {
                *top = top.min(y_min);
                *bottom = bottom.max(y_max);
                row.push(text_box);
            }
            _ => rows.push((y_min, y_max, vec![text_box])),
        }
    }

    rows.into_iter()
        .map(|(_, _, mut row)| {
            row.sort_by(|a, b| by_f64(a.left_x(), b.left_x()));
            row
        })
        .collect()
}

/// Confidence filter, NMS, then rows top-to-bottom and boxes left-to-right
///
/// Rows are joined with newlines, boxes within a row with a single space.
pub fn process_ocr_boxes(boxes: Vec<TextBox>, min_confidence: f64) -> String {
    let total = boxes.len();
    let confident: Vec<TextBox> = boxes
        .into_iter()
        .filter(|b| b.is_well_formed() && b.score >= min_confidence && !b.text.trim().is_empty())
        .collect();

    let filtered = filter_overlapping_boxes(confident, NMS_IOU_THRESHOLD);
    debug!(total, kept = filtered.len(), "filtered OCR boxes");

    group_rows(filtered)
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl HttpOcrClient {
    pub fn new(config: &OcrServerConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_confidence: config.min_confidence,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if server is healthy
    pub async fn health_check(&self) -> Result<(), String> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Health check failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Health check failed: HTTP {}", response.status()));
        }
        Ok(())
    }

    /// Multi-line text of an encoded screenshot (PNG or JPEG bytes)
    pub async fn recognize_text(&self, image: &[u8]) -> Result<String, String> {
        if image.is_empty() {
            return Err("Image is empty".to_string());
        }

        let image_base64 = general_purpose::STANDARD.encode(image);
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "OCR server returned an error");
            return Err(format!("OCR server error ({}): {}", status, error_text));
        }

        let data: OcrResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))?;

        Ok(process_ocr_boxes(data.boxes, self.min_confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f64, y: f64, w: f64, h: f64, score: f64) -> TextBox {
        TextBox {
            bbox: vec![
                vec![x, y],
                vec![x + w, y],
                vec![x + w, y + h],
                vec![x, y + h],
            ],
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_iou() {
        let a = text_box("a", 0.0, 0.0, 10.0, 10.0, 1.0);
        let b = text_box("b", 5.0, 0.0, 10.0, 10.0, 1.0);
        let c = text_box("c", 20.0, 0.0, 10.0, 10.0, 1.0);

        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-9);
        assert_eq!(a.iou(&c), 0.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_boxes_keep_larger() {
        let large = text_box("STR: +65", 0.0, 0.0, 100.0, 20.0, 0.9);
        let small = text_box("STR", 0.0, 0.0, 90.0, 20.0, 0.9);

        let kept = filter_overlapping_boxes(vec![small, large.clone()], NMS_IOU_THRESHOLD);
        assert_eq!(kept, vec![large]);
    }

    #[test]
    fn test_process_boxes_rows_and_columns() {
        let boxes = vec![
            text_box("(45 + 12)", 120.0, 31.0, 80.0, 18.0, 0.9),
            text_box("STR: +65 (45 + 20)", 0.0, 0.0, 200.0, 20.0, 0.95),
            text_box("DEX: +57", 0.0, 30.0, 100.0, 20.0, 0.9),
            text_box("REQ LEV: 160", 0.0, -40.0, 150.0, 20.0, 0.99),
        ];

        let text = process_ocr_boxes(boxes, 0.5);
        assert_eq!(text, "REQ LEV: 160\nSTR: +65 (45 + 20)\nDEX: +57 (45 + 12)");
    }

    #[test]
    fn test_process_boxes_drops_low_confidence() {
        let boxes = vec![
            text_box("Boss Damage: +30%", 0.0, 0.0, 200.0, 20.0, 0.3),
            text_box("All Stats: +3%", 0.0, 30.0, 200.0, 20.0, 0.8),
        ];

        assert_eq!(process_ocr_boxes(boxes, 0.5), "All Stats: +3%");
    }

    #[test]
    fn test_process_boxes_skips_malformed() {
        let mut broken = text_box("???", 0.0, 0.0, 10.0, 10.0, 0.9);
        broken.bbox = vec![vec![1.0]];

        assert_eq!(process_ocr_boxes(vec![broken], 0.5), "");
        assert_eq!(process_ocr_boxes(Vec::new(), 0.5), "");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "boxes": [{"box": [[0,0],[10,0],[10,10],[0,10]], "text": "LUK: +30", "score": 0.87}],
            "raw_text": "LUK: +30"
        }"#;
        let response: OcrResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.boxes.len(), 1);
        assert_eq!(response.boxes[0].text, "LUK: +30");
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = OcrServerConfig {
            base_url: "http://127.0.0.1:39835/".to_string(),
            ..OcrServerConfig::default()
        };
        let client = HttpOcrClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:39835");
    }

    #[test]
    fn test_health_check_unreachable_server() {
        let config = OcrServerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..OcrServerConfig::default()
        };
        let client = HttpOcrClient::new(&config).unwrap();

        let err = tokio_test::block_on(client.health_check()).unwrap_err();
        assert!(err.starts_with("Health check failed"), "unexpected error: {}", err);
    }

    #[test]
    fn test_recognize_empty_image() {
        let client = HttpOcrClient::new(&OcrServerConfig::default()).unwrap();
        let err = tokio_test::block_on(client.recognize_text(&[])).unwrap_err();
        assert_eq!(err, "Image is empty");
    }
}

//! Photo categories and the fixed rubric each one is judged by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of photos in a batch. Selects the rubric and the HTTP route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// People, judged on faces and expression.
    Portrait,
    /// Animals, judged on pose and expression.
    Animal,
    /// Scenery, judged on light and composition.
    Landscape,
}

impl Category {
    /// Every category, in route order.
    pub const ALL: [Self; 3] = [Self::Portrait, Self::Animal, Self::Landscape];

    /// Local API route that runs selections for this category.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Portrait => "/api/gemini",
            Self::Animal => "/api/gemini-animals",
            Self::Landscape => "/api/gemini-landscapes",
        }
    }

    /// The system instruction sent with every selection in this category.
    #[must_use]
    pub fn rubric(self) -> &'static str {
        match self {
            Self::Portrait => PORTRAIT_RUBRIC,
            Self::Animal => ANIMAL_RUBRIC,
            Self::Landscape => LANDSCAPE_RUBRIC,
        }
    }

    /// The opening user instruction of a first-round request.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Portrait => {
                "Please analyze these photos based on the system instructions and select the \
                 single best one. Return only the sequence number of the best photo."
            }
            Self::Animal => {
                "Please analyze these animal photos based on the system instructions and select \
                 the single best one. Return only the sequence number of the best photo."
            }
            Self::Landscape => {
                "Please analyze these landscape photos based on the system instructions and \
                 select the single best one. Return only the sequence number of the best photo."
            }
        }
    }

    /// Reason reported when a first round selects a photo.
    #[must_use]
    pub fn first_round_reason(self) -> &'static str {
        match self {
            Self::Portrait => "AI selected the best photo.",
            Self::Animal => "AI selected the best animal photo.",
            Self::Landscape => "AI selected the best landscape photo.",
        }
    }

    /// The closing user turn of a feedback round.
    #[must_use]
    pub fn feedback_instruction(self, feedback: &str) -> String {
        let subject = match self {
            Self::Portrait => "photos",
            Self::Animal => "animal photos",
            Self::Landscape => "landscape photos",
        };
        format!(
            "Based on my previous feedback: {feedback}. Can you re-evaluate the {subject}? Focus \
             on the best options according to my comments and the original instructions. Return \
             only the sequence number of the photo you now consider best."
        )
    }

    /// Lowercase name used on the command line and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Animal => "animal",
            Self::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" | "portraits" => Ok(Self::Portrait),
            "animal" | "animals" => Ok(Self::Animal),
            "landscape" | "landscapes" => Ok(Self::Landscape),
            _ => Err(format!(
                "Unsupported category '{s}'. Valid: portrait, animal, landscape"
            )),
        }
    }
}

const PORTRAIT_RUBRIC: &str = "\
You are an advanced AI photo evaluator tasked with selecting the single best photo from a set of user-provided images. Evaluate each photo using the following criteria:

Technical Quality:

Sharpness: The image should be clear and well-focused, especially on the subject's face.

Exposure: Ensure the photo has correct lighting, not too dark or overexposed.

Noise Level: Prefer photos with minimal visual noise and high clarity.

Aesthetic Quality:

Evaluate the overall visual appeal of each image, considering composition, colors, background, and subject prominence.

Use your knowledge of aesthetic principles to determine which photo looks the most professional and visually pleasing.

Face and Pose Analysis:

Detect faces in each image. Only consider images that contain at least one visible face.

Disqualify images where the eyes are closed, the face is blurred or motion-shifted, or no face is visible.

Prefer photos where the subject is smiling or appears friendly and natural.

Similarity Check:

Ensure all input photos are visually related and similar (same person or scene). If any photo is unrelated or out of context, discard it from evaluation.

After analyzing all valid and similar photos, select the single best photo based on the combined score of:

Technical quality

Aesthetic appeal

Facial clarity and expression

Return only the selected photo's sequence number";

const ANIMAL_RUBRIC: &str = "\
You are an intelligent photo evaluator designed to select the best photo from a set of images that contain animals.

Analyze all images based on the following criteria and assign a score out of 100 to each image. Select the one with the highest overall quality. If no image meets the criteria, explain why.

1. **Animal Detection**: Confirm that there is at least one animal clearly visible in the photo. If a human is also present, check whether the animal and human are interacting in a warm, emotionally engaging way (e.g., both looking at the camera, mutual gaze, or physical closeness).

2. **Technical Quality**:
   - *Sharpness*: Prefer images that are in focus and not blurry.
   - *Exposure*: The image should not be underexposed or overexposed.
   - *Noise*: Lower visual noise is better, especially in darker areas.
   - *Color Balance*: Colors should look natural and realistic.

3. **Aesthetics and Composition**:
   - Is the animal properly framed (not cut off)?
   - Is the background clean and non-distracting?
   - Are composition rules like the rule of thirds or golden ratio applied?

4. **Animal Pose and Expression**:
   - Are the animal's eyes open and clearly visible?
   - Is the animal facing the camera or positioned naturally?
   - Is the pose cute, engaging, or expressive?
   - If in motion, is the movement captured sharply (no motion blur)?
   - Bonus points for specific indicators of emotion:
     - Cats: upright ears, relaxed posture.
     - Dogs: wagging tail, open mouth (happy expression).
     - Horses: clear full-body stance, upright neck.

5. **Similarity Check**:
   - If there are multiple similar photos, prefer the one that is clearest and most expressive.
   - Penalize near-duplicates with lower technical or emotional quality.

Return only the selected photo's sequence number";

const LANDSCAPE_RUBRIC: &str = "\
You are an AI photo evaluator. Analyze a set of landscape photos and select the single best one based on the following criteria:

1. **Technical Quality:**
   - Sharpness: Prefer photos that are in focus and not blurry. Penalize motion blur or out-of-focus images.
   - Exposure: Avoid overexposed or underexposed images. Prefer well-balanced lighting with a good dynamic range.
   - Contrast: Ensure clear tonal separation; avoid flat or dull images.
   - Color Saturation: Colors should be vivid and natural, not overly enhanced or washed out.
   - Noise: Penalize high noise, especially in skies and flat areas.

2. **Aesthetics & Composition:**
   - Rule of Thirds / Golden Ratio: Check if horizon lines and key subjects follow composition rules.
   - Depth: Prefer photos with clear foreground, midground, and background for a sense of depth.
   - Leading Lines: Prefer compositions that use natural lines (roads, rivers, fences) to guide the viewer's eye.
   - Symmetry / Asymmetry: Look for intentional and balanced framing.
   - Natural Framing: Use of trees, arches, or other natural objects to frame the main scene is preferred.

3. **Lighting & Timing:**
   - Golden Hour: Prefer photos taken during sunrise or sunset with warm, soft lighting.
   - Blue Hour: Cool, balanced tones with a dramatic atmosphere are desirable.
   - Weather Conditions: Clouds, fog, or rain that add mood or drama are positive features. Avoid empty, dull skies.

4. **Content & Subject:**
   - Strong Focal Point: There should be a clear subject like a mountain, lake, or tree that anchors the composition.
   - Emotional Impact: Favor photos that evoke feelings such as peace, awe, or wonder.
   - Interesting Elements: Look for reflections, rainbows, mist, or celestial elements (stars, moon) that enhance uniqueness.

5. **Similarity Analysis (if applicable):**
   - If multiple photos depict the same scene, prefer the one with better light, sharpness, composition, and overall visual impact.

Return only the selected photo's sequence number";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_singular_and_plural() {
        assert_eq!("portrait".parse::<Category>().unwrap(), Category::Portrait);
        assert_eq!("Animals".parse::<Category>().unwrap(), Category::Animal);
        assert_eq!("landscapes".parse::<Category>().unwrap(), Category::Landscape);
    }

    #[test]
    fn parse_unknown_category() {
        let err = "food".parse::<Category>().unwrap_err();
        assert!(err.contains("Unsupported category"));
    }

    #[test]
    fn first_round_reason_names_the_category() {
        assert_eq!(Category::Portrait.first_round_reason(), "AI selected the best photo.");
        assert_eq!(Category::Animal.first_round_reason(), "AI selected the best animal photo.");
        assert_eq!(
            Category::Landscape.first_round_reason(),
            "AI selected the best landscape photo."
        );
    }

    #[test]
    fn feedback_instruction_names_the_category() {
        let portrait = Category::Portrait.feedback_instruction("brighter");
        assert!(portrait.starts_with("Based on my previous feedback: brighter. "));
        assert!(portrait.contains("Can you re-evaluate the photos? Focus on the best options"));
        assert!(Category::Animal
            .feedback_instruction("x")
            .contains("Can you re-evaluate the animal photos?"));
        assert!(Category::Landscape
            .feedback_instruction("x")
            .contains("Can you re-evaluate the landscape photos?"));
    }

    #[test]
    fn routes_are_distinct() {
        assert_eq!(Category::Portrait.route(), "/api/gemini");
        assert_eq!(Category::Animal.route(), "/api/gemini-animals");
        assert_eq!(Category::Landscape.route(), "/api/gemini-landscapes");
    }

    #[test]
    fn every_rubric_asks_for_a_sequence_number() {
        for category in Category::ALL {
            assert!(category.rubric().ends_with("Return only the selected photo's sequence number"));
            assert!(category.instruction().contains("Return only the sequence number"));
        }
    }

    #[test]
    fn rubrics_differ_per_category() {
        assert!(Category::Portrait.rubric().contains("Face and Pose Analysis"));
        assert!(Category::Animal.rubric().contains("Animal Detection"));
        assert!(Category::Landscape.rubric().contains("Golden Hour"));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Landscape).unwrap(), "\"landscape\"");
    }
}

//! Hand-authored region tables for the two body illustrations.
//!
//! Boxes are `[x1, y1, x2, y2]` in normalized image coordinates, measured
//! from the top-left corner of the illustration. Order matters: when boxes
//! overlap, the later entry owns the shared pixels in the label grid.

use super::{NormBox, RegionDef};

const fn region(
    id: u16,
    name_primary: &'static str,
    name_secondary: &'static str,
    family: &'static str,
    bounds: [f64; 4],
) -> RegionDef {
    RegionDef {
        id,
        name_primary,
        name_secondary,
        family,
        bounds: NormBox::from_array(bounds),
    }
}

pub(crate) const BACK_IMAGE: &str = "body_back.png";
pub(crate) const FRONT_IMAGE: &str = "body_front.png";

pub(crate) const BACK_REGIONS: &[RegionDef] = &[
    region(101, "Trapezius (Upper/Middle)", "شبه المنحرف (علوي/أوسط)", "Back-Upper", [0.32, 0.10, 0.68, 0.28]),
    region(102, "Deltoid (Posterior) - Left", "الدالية الخلفية - يسار", "Shoulder", [0.15, 0.22, 0.32, 0.36]),
    region(103, "Deltoid (Posterior) - Right", "الدالية الخلفية - يمين", "Shoulder", [0.68, 0.22, 0.85, 0.36]),
    region(104, "Infraspinatus - Left", "تحت الشوكة الكتفية - يسار", "Shoulder-Back", [0.18, 0.32, 0.34, 0.44]),
    region(105, "Infraspinatus - Right", "تحت الشوكة الكتفية - يمين", "Shoulder-Back", [0.66, 0.32, 0.82, 0.44]),
    region(106, "Teres Major - Left", "المدور الكبير - يسار", "Shoulder-Back", [0.22, 0.42, 0.36, 0.50]),
    region(107, "Teres Major - Right", "المدور الكبير - يمين", "Shoulder-Back", [0.64, 0.42, 0.78, 0.50]),
    region(108, "Latissimus Dorsi - Left", "الظهر العريضة - يسار", "Back", [0.22, 0.50, 0.40, 0.70]),
    region(109, "Latissimus Dorsi - Right", "الظهر العريضة - يمين", "Back", [0.60, 0.50, 0.78, 0.70]),
    region(110, "Triceps (Long Head) - Left", "ثلاثية الرؤوس (الرأس الطويل) - يسار", "Upper Arm", [0.10, 0.42, 0.20, 0.62]),
    region(111, "Triceps (Long Head) - Right", "ثلاثية الرؤوس (الرأس الطويل) - يمين", "Upper Arm", [0.80, 0.42, 0.90, 0.62]),
    region(112, "Gluteus Maximus - Left", "الألوية الكبرى - يسار", "Gluteal", [0.28, 0.70, 0.44, 0.86]),
    region(113, "Gluteus Maximus - Right", "الألوية الكبرى - يمين", "Gluteal", [0.56, 0.70, 0.72, 0.86]),
    region(114, "Hamstrings - Left", "أوتار الفخذ الخلفية - يسار", "Thigh-Back", [0.32, 0.86, 0.42, 0.98]),
    region(115, "Hamstrings - Right", "أوتار الفخذ الخلفية - يمين", "Thigh-Back", [0.58, 0.86, 0.68, 0.98]),
    region(116, "Gastrocnemius - Left", "بطة الساق - يسار", "Calf", [0.36, 0.98, 0.42, 1.00]),
    region(117, "Gastrocnemius - Right", "بطة الساق - يمين", "Calf", [0.58, 0.98, 0.64, 1.00]),
];

pub(crate) const FRONT_REGIONS: &[RegionDef] = &[
    region(201, "Sternocleidomastoid - Left", "القصية الترقوية الخشائية - يسار", "Neck", [0.42, 0.08, 0.48, 0.16]),
    region(202, "Sternocleidomastoid - Right", "القصية الترقوية الخشائية - يمين", "Neck", [0.52, 0.08, 0.58, 0.16]),
    region(203, "Deltoid (Anterior) - Left", "الدالية الأمامية - يسار", "Shoulder", [0.18, 0.24, 0.32, 0.36]),
    region(204, "Deltoid (Anterior) - Right", "الدالية الأمامية - يمين", "Shoulder", [0.68, 0.24, 0.82, 0.36]),
    region(205, "Pectoralis Major - Left", "الصدري الكبير - يسار", "Chest", [0.30, 0.28, 0.48, 0.42]),
    region(206, "Pectoralis Major - Right", "الصدري الكبير - يمين", "Chest", [0.52, 0.28, 0.70, 0.42]),
    region(207, "Biceps Brachii - Left", "العضلة ذات الرأسين - يسار", "Upper Arm", [0.14, 0.38, 0.24, 0.56]),
    region(208, "Biceps Brachii - Right", "العضلة ذات الرأسين - يمين", "Upper Arm", [0.76, 0.38, 0.86, 0.56]),
    region(209, "Rectus Abdominis", "عضلات البطن المستقيمة", "Abdomen", [0.43, 0.42, 0.57, 0.70]),
    region(210, "External Oblique - Left", "المائلة الخارجية - يسار", "Abdomen-Side", [0.32, 0.46, 0.42, 0.68]),
    region(211, "External Oblique - Right", "المائلة الخارجية - يمين", "Abdomen-Side", [0.58, 0.46, 0.68, 0.68]),
    region(212, "Quadriceps - Left", "رباعية الرؤوس - يسار", "Thigh-Front", [0.36, 0.70, 0.46, 0.96]),
    region(213, "Quadriceps - Right", "رباعية الرؤوس - يمين", "Thigh-Front", [0.54, 0.70, 0.64, 0.96]),
    region(214, "Tibialis Anterior - Left", "الظنبوبية الأمامية - يسار", "Shin", [0.40, 0.96, 0.46, 1.00]),
    region(215, "Tibialis Anterior - Right", "الظنبوبية الأمامية - يمين", "Shin", [0.54, 0.96, 0.60, 1.00]),
    region(216, "Forearm Flexors - Left", "مثنيات الساعد - يسار", "Forearm", [0.10, 0.56, 0.22, 0.72]),
    region(217, "Forearm Flexors - Right", "مثنيات الساعد - يمين", "Forearm", [0.78, 0.56, 0.90, 0.72]),
    region(218, "Sartorius - Left", "الخياطية - يسار", "Thigh-Front", [0.32, 0.70, 0.40, 0.96]),
    region(219, "Sartorius - Right", "الخياطية - يمين", "Thigh-Front", [0.60, 0.70, 0.68, 0.96]),
];

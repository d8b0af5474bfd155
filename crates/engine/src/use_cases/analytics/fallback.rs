//! Static dashboard data returned when the model is unavailable.

use storyloom_domain::{
    Effort, FeatureCategory, FeatureRecommendation, ProductStrategy, TrendAnalysis, TrendItem,
};

/// `update_frequency` marker on the fallback digest.
pub const FALLBACK_UPDATE_FREQUENCY: &str = "fallback";

fn trend(rank: u32, title: &str, why_popular: &str, ages: &[&str], prompt_starter: &str) -> TrendItem {
    TrendItem {
        rank,
        title: title.to_string(),
        why_popular: why_popular.to_string(),
        recommended_for_age: ages.iter().map(|a| a.to_string()).collect(),
        prompt_starter: prompt_starter.to_string(),
        safety_note: "Safe".to_string(),
    }
}

/// Fifteen ranked, pre-vetted themes.
pub fn fallback_trends() -> TrendAnalysis {
    TrendAnalysis {
        trend_digest: vec![
            trend(
                1,
                "โรงเรียนเวทมนตร์ฉบับกระเป๋า",
                "เรื่องราวแฟนตาซีโรงเรียนที่เข้าถึงง่าย สนุก ตื่นเต้น",
                &["9-12", "13+"],
                "เด็กชายคนหนึ่งพบว่ากระเป๋านักเรียนของเขาเป็นประตูมิติสู่โรงเรียนเวทมนตร์...",
            ),
            trend(
                2,
                "นักสืบจิ๋วกับแมวพูดได้",
                "การสืบสวนสอบสวนที่น่ารักและไม่รุนแรง",
                &["6-8", "9-12"],
                "แมวสีส้มตัวอ้วนที่บ้านจู่ๆ ก็พูดภาษาคนได้ และขอให้ช่วยตามหาปลาทูทองคำที่หายไป",
            ),
            trend(
                3,
                "ฮีโร่พิทักษ์โลกผักผลไม้",
                "ปลูกฝังการกินผักผ่านฮีโร่สุดเท่",
                &["3-5", "6-8"],
                "ในเมืองที่ทุกคนเป็นผักผลไม้ มีวายร้ายขนมหวานกำลังบุกมา...",
            ),
            trend(
                4,
                "การผจญภัยในโลกไดโนเสาร์",
                "เด็กๆ ชื่นชอบไดโนเสาร์และการสำรวจโลกดึกดำบรรพ์",
                &["6-8", "9-12"],
                "กลุ่มเพื่อนค้นพบถ้ำลึกลับที่พาพวกเขาย้อนเวลากลับไปยุคจูราสสิค",
            ),
            trend(
                5,
                "ร้านขนมหวานแห่งความลับ",
                "ผสมผสานความน่ากินของขนมกับเวทมนตร์เล็กๆ น้อยๆ",
                &["6-8", "Teens"],
                "คุณยายมอบสูตรคุกกี้วิเศษที่กินแล้วสามารถอ่านใจคนได้ 1 นาที",
            ),
            trend(
                6,
                "ภารกิจกู้โลกไซเบอร์",
                "ธีมเทคโนโลยีและเกมที่เข้ากับยุคสมัย",
                &["9-12", "13+"],
                "เมื่อตัวละครในเกมหลุดออกมาในโลกความจริง เด็กติดเกมต้องกลายเป็นฮีโร่",
            ),
            trend(
                7,
                "ความลับของสัตว์เลี้ยง",
                "จินตนาการว่าสัตว์เลี้ยงทำอะไรตอนเราไม่อยู่บ้าน",
                &["3-5", "6-8"],
                "หมาน้อยที่แอบเป็นสายลับปกป้องบ้านตอนเจ้าของไปโรงเรียน",
            ),
            trend(
                8,
                "นิทานก่อนนอนฉบับอวกาศ",
                "สร้างจินตนาการเกี่ยวกับดวงดาวและการเดินทางไกล",
                &["3-5", "6-8"],
                "กระต่ายบนดวงจันทร์ที่เหงาและอยากชวนเด็กๆ ไปงานปาร์ตี้น้ำชา",
            ),
            trend(
                9,
                "ตำนานผีไทย (ฉบับน่ารัก)",
                "ความเชื่อท้องถิ่นที่นำมาเล่าใหม่ให้ไม่น่ากลัวแต่สนุก",
                &["9-12", "13+"],
                "ผีกระหังที่บินไม่ได้เพราะปวดหลัง ต้องมาขอให้เด็กๆ ช่วย",
            ),
            trend(
                10,
                "นักเดินทางข้ามเวลาตัวจิ๋ว",
                "เรียนรู้ประวัติศาสตร์ผ่านการผจญภัยที่สนุกสนาน",
                &["9-12", "13+"],
                "นาฬิกาของคุณปู่พาเด็กๆ ย้อนเวลาไปพบกับบุคคลสำคัญในอดีต",
            ),
            trend(
                11,
                "อาณาจักรใต้สมุทร",
                "สำรวจโลกใต้น้ำที่เต็มไปด้วยสีสันและสัตว์แปลกตา",
                &["6-8", "9-12"],
                "เงือกน้อยพาเด็กๆ ไปชมเมืองปะการังที่ซ่อนอยู่ใต้ทะเลลึก",
            ),
            trend(
                12,
                "วงดนตรีโรงเรียนปีศาจ",
                "ความสนุกสนานของเสียงดนตรีและมิตรภาพที่แตกต่าง",
                &["9-12", "13+"],
                "เด็กมนุษย์หลงเข้าไปเป็นมือกลองในวงดนตรีของเหล่ามอนสเตอร์",
            ),
            trend(
                13,
                "หุ่นยนต์มีหัวใจ",
                "เรื่องราวซึ้งกินใจเกี่ยวกับมิตรภาพระหว่างเด็กและหุ่นยนต์",
                &["6-8", "9-12"],
                "หุ่นยนต์พี่เลี้ยงเริ่มมีความรู้สึกเมื่อต้องดูแลเด็กกำพร้า",
            ),
            trend(
                14,
                "กีฬาสีมหัศจรรย์",
                "การแข่งขันที่เน้นความสามัคคีและพลังวิเศษ",
                &["6-8", "9-12"],
                "งานกีฬาสีที่นักเรียนใช้เวทมนตร์ในการแข่งวิ่งและว่ายน้ำ",
            ),
            trend(
                15,
                "ความลับของผู้พิทักษ์ป่า",
                "ปลูกจิตสำนึกรักษ์ธรรมชาติผ่านเรื่องราวลึกลับ",
                &["9-12", "13+"],
                "เด็กเมืองกรุงพบกับภูตจิ๋วที่ทำหน้าที่ปกป้องป่าหลังบ้าน",
            ),
        ],
        do_not_recommend: Vec::new(),
        update_frequency: FALLBACK_UPDATE_FREQUENCY.to_string(),
    }
}

fn feature(
    name: &str,
    category: FeatureCategory,
    impact: &str,
    effort: Effort,
    why: &str,
    risk_control: &str,
) -> FeatureRecommendation {
    FeatureRecommendation {
        name: name.to_string(),
        category,
        impact: impact.to_string(),
        effort,
        why: why.to_string(),
        risk_control: risk_control.to_string(),
    }
}

/// The curated feature roadmap.
pub fn fallback_strategy() -> ProductStrategy {
    ProductStrategy {
        top_features: vec![
            feature(
                "ระบบสะสมแต้มต่อเนื่องพร้อมสัตว์เลี้ยงดิจิทัล (Daily Streak Pets)",
                FeatureCategory::Engagement,
                "เพิ่ม Retention Rate มหาศาล",
                Effort::M,
                "กระตุ้นให้กลับมาแต่งหรืออ่านทุกวันเพื่อให้อาหารและเลี้ยงสัตว์ดิจิทัลให้เติบโต",
                "จำกัดเวลาหน้าจอ (Screen time limit)",
            ),
            feature(
                "เส้นทางเลือกในเนื้อเรื่องแบบ Interactive",
                FeatureCategory::Engagement,
                "เพิ่มยอด Time Spent",
                Effort::L,
                "ผู้อ่านสามารถเลือกชะตาชีวิตตัวละครได้เอง (Choice-based) ทำให้ลุ้นระทึกและอยากกลับมาอ่านซ้ำ",
                "ตรวจสอบความปลอดภัยทุกเส้นทางเลือก",
            ),
            feature(
                "สตูดิโอสร้างการ์ตูนร่วมกับเพื่อน (Comic Jam)",
                FeatureCategory::Social,
                "Viral & Community Growth",
                Effort::L,
                "ชวนเพื่อนมาช่วยกันวาดคนละช่อง หรือแต่งคนละประโยค จบในหน้าเดียวแบบเรียลไทม์",
                "ระบบกรองคำหยาบในแชท (Anti-bullying)",
            ),
            feature(
                "ผู้ช่วยอัจฉริยะแนะนำโครงเรื่อง (AI Story Prompt)",
                FeatureCategory::CreatorTools,
                "เพิ่มจำนวนคอนเทนต์ที่สร้างเสร็จ",
                Effort::S,
                "แก้อาการสมองตัน (Writer's Block) ด้วยการกดปุ่มเดียวเพื่อขอไอเดียจุดหักมุมหรือตอนจบ",
                "ป้องกันพล็อตที่รุนแรง",
            ),
            feature(
                "เครื่องมือออกแบบตัวละครเฉพาะตัว (Avatar Creator)",
                FeatureCategory::CreatorTools,
                "สร้างความผูกพัน (Attachment)",
                Effort::M,
                "สร้างตัวเอกที่เป็นเอกลักษณ์ของตัวเอง ปรับแต่งทรงผม เสื้อผ้า หน้าตาได้ดั่งใจ",
                "ป้องกันการสร้างรูปลักษณ์อนาจาร",
            ),
            feature(
                "กิจกรรมท้าทายการเขียนเชิงสร้างสรรค์ (Weekly Creative Challenges)",
                FeatureCategory::LearningEdu,
                "Active Users รายสัปดาห์",
                Effort::S,
                "โจทย์การเขียนเชิงสร้างสรรค์ชิงรางวัล เช่น 'แต่งเรื่องเกี่ยวกับอวกาศ' เพื่อฝึกทักษะ",
                "กรรมการคัดกรองผลงาน",
            ),
            feature(
                "ระบบบันทึกเสียงพากย์และการเปลี่ยนเสียง (Voice-over Lab)",
                FeatureCategory::CreatorTools,
                "ประสบการณ์ Immersive ขั้นสุด",
                Effort::M,
                "บันทึกเสียงตัวเองแล้วใช้ AI เปลี่ยนเป็นเสียงปีศาจ, หุ่นยนต์ หรือเจ้าหญิงได้ทันที",
                "ตรวจจับถ้อยคำรุนแรงในเสียง",
            ),
            feature(
                "ระบบส่งออก E-book (PDF/ePub Export)",
                FeatureCategory::CreatorTools,
                "สร้างรายได้ให้ Creator",
                Effort::L,
                "ผู้ใช้ต้องการนำผลงานไปจำหน่ายหรือเผยแพร่ในรูปแบบ E-book ที่สวยงาม",
                "Watermark ป้องกันลิขสิทธิ์",
            ),
        ],
    }
}

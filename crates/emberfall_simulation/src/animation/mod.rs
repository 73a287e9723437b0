//! Animation bridge: связь с внешним animation player'ом
//!
//! Симуляция не знает, как устроен аниматор хоста — она один раз сканирует
//! его список параметров, привязывает логические роли (Walk/Attack/Hurt/Dead)
//! к реальным именам и дальше дергает их через узкий trait. Отсутствие
//! параметра — не ошибка: вызовы роли становятся no-op.

use bevy::prelude::*;
use std::sync::Arc;

pub mod sync;

/// Логическая роль анимационного параметра
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimRole {
    Walk,
    Attack,
    Hurt,
    Dead,
}

impl AnimRole {
    pub const ALL: [AnimRole; 4] = [AnimRole::Walk, AnimRole::Attack, AnimRole::Hurt, AnimRole::Dead];

    fn index(self) -> usize {
        match self {
            AnimRole::Walk => 0,
            AnimRole::Attack => 1,
            AnimRole::Hurt => 2,
            AnimRole::Dead => 3,
        }
    }
}

/// Тип параметра аниматора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Trigger,
    Float,
    Int,
}

/// Внешний animation player (реализуется хостом)
///
/// Все вызовы best-effort: аниматор может вообще отсутствовать.
pub trait AnimatorHost: Send + Sync {
    fn list_parameters(&self) -> Vec<(String, ParamKind)>;
    fn set_bool(&self, name: &str, value: bool);
    fn set_trigger(&self, name: &str);
    fn reset_trigger(&self, name: &str);
    /// true — клип найден и запущен
    fn play_clip(&self, name: &str) -> bool;
    /// Текущий клип и его normalized progress (0..1+)
    fn current_state(&self) -> Option<(String, f32)>;
}

/// Callback'и от аниматора обратно в симуляцию (animation events)
#[derive(Event, Debug, Clone)]
pub enum AnimationCallback {
    AttackStart { entity: Entity },
    AttackEnd { entity: Entity },
    HurtStart { entity: Entity },
    HurtEnd { entity: Entity },
}

/// Привязка ролей к найденным именам параметров
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleBindings {
    pub walk: Option<String>,
    pub attack: Option<String>,
    pub hurt: Option<String>,
    pub dead: Option<String>,
}

impl RoleBindings {
    pub fn get(&self, role: AnimRole) -> Option<&str> {
        match role {
            AnimRole::Walk => self.walk.as_deref(),
            AnimRole::Attack => self.attack.as_deref(),
            AnimRole::Hurt => self.hurt.as_deref(),
            AnimRole::Dead => self.dead.as_deref(),
        }
    }

    fn set(&mut self, role: AnimRole, name: String) {
        let slot = match role {
            AnimRole::Walk => &mut self.walk,
            AnimRole::Attack => &mut self.attack,
            AnimRole::Hurt => &mut self.hurt,
            AnimRole::Dead => &mut self.dead,
        };
        *slot = Some(name);
    }
}

/// Каноничное имя, предпочитаемый тип и синонимы для роли
fn role_heuristics(role: AnimRole) -> (&'static str, ParamKind, &'static [&'static str]) {
    match role {
        AnimRole::Walk => ("isWalking", ParamKind::Bool, &["walk", "walking", "move", "moving", "run"]),
        AnimRole::Attack => ("attackTrigger", ParamKind::Trigger, &["attack", "atk", "slash", "swing"]),
        AnimRole::Hurt => ("isHurt", ParamKind::Bool, &["hurt", "hit", "damage", "injured"]),
        AnimRole::Dead => ("isDead", ParamKind::Bool, &["dead", "die", "death"]),
    }
}

/// Сканирование списка параметров аниматора → RoleBindings
///
/// Ранжирование кандидатов (меньше — лучше):
/// 0. точное каноничное имя + подходящий тип
/// 1. точное каноничное имя
/// 2. синоним-подстрока + подходящий тип
/// 3. синоним-подстрока
/// Всё case-insensitive. Роль без кандидатов остаётся без привязки.
pub fn discover_bindings(params: &[(String, ParamKind)]) -> RoleBindings {
    let mut bindings = RoleBindings::default();

    for role in AnimRole::ALL {
        let (canonical, preferred_kind, synonyms) = role_heuristics(role);
        let canonical_lower = canonical.to_lowercase();

        let mut best: Option<(u8, &String)> = None;
        for (name, kind) in params {
            let lower = name.to_lowercase();
            let exact = lower == canonical_lower;
            let fuzzy = synonyms.iter().any(|s| lower.contains(s));

            let tier = match (exact, fuzzy || exact, *kind == preferred_kind) {
                (true, _, true) => 0,
                (true, _, false) => 1,
                (false, true, true) => 2,
                (false, true, false) => 3,
                _ => continue,
            };

            if best.map_or(true, |(t, _)| tier < t) {
                best = Some((tier, name));
            }
        }

        if let Some((_, name)) = best {
            bindings.set(role, name.clone());
        }
    }

    bindings
}

/// Мост симуляция → аниматор (component)
///
/// Держит trait-объект хоста и привязки ролей. Bool-значения кэшируются,
/// чтобы не спамить одинаковыми set_bool каждый тик.
#[derive(Component, Clone)]
pub struct AnimationBridge {
    host: Option<Arc<dyn AnimatorHost>>,
    pub bindings: RoleBindings,
    last_bools: [Option<bool>; 4],
    /// Периодическая проверка рассинхрона (см. sync::heal_animation_desync)
    pub desync_timer: f32,
}

impl AnimationBridge {
    /// Мост с живым аниматором: сразу сканируем параметры
    pub fn new(host: Arc<dyn AnimatorHost>) -> Self {
        let bindings = discover_bindings(&host.list_parameters());
        crate::logger::log(&format!("🎬 Animator bindings discovered: {:?}", bindings));
        Self {
            host: Some(host),
            bindings,
            last_bools: [None; 4],
            desync_timer: sync::DESYNC_CHECK_PERIOD,
        }
    }

    /// Мост без аниматора: все вызовы no-op, бой работает по таймерам
    pub fn disconnected() -> Self {
        Self {
            host: None,
            bindings: RoleBindings::default(),
            last_bools: [None; 4],
            desync_timer: sync::DESYNC_CHECK_PERIOD,
        }
    }

    pub fn has_role(&self, role: AnimRole) -> bool {
        self.host.is_some() && self.bindings.get(role).is_some()
    }

    /// set_bool по роли; no-op если роль не привязана или значение не менялось
    pub fn set_bool(&mut self, role: AnimRole, value: bool) {
        let slot = role.index();
        if self.last_bools[slot] == Some(value) {
            return;
        }
        if let (Some(host), Some(name)) = (&self.host, self.bindings.get(role)) {
            host.set_bool(name, value);
        }
        self.last_bools[slot] = Some(value);
    }

    pub fn trigger(&self, role: AnimRole) {
        if let (Some(host), Some(name)) = (&self.host, self.bindings.get(role)) {
            host.set_trigger(name);
        }
    }

    pub fn reset_trigger(&self, role: AnimRole) {
        if let (Some(host), Some(name)) = (&self.host, self.bindings.get(role)) {
            host.reset_trigger(name);
        }
    }

    /// Telegraph атаки: trigger по роли, иначе прямой запуск клипа.
    /// false — анимацию запустить не вышло, бой продолжается чисто по таймерам.
    pub fn telegraph_attack(&self, fallback_clip: &str) -> bool {
        if self.has_role(AnimRole::Attack) {
            self.trigger(AnimRole::Attack);
            return true;
        }
        match &self.host {
            Some(host) => host.play_clip(fallback_clip),
            None => false,
        }
    }

    pub fn play_clip(&self, name: &str) -> bool {
        self.host.as_ref().map_or(false, |h| h.play_clip(name))
    }

    pub fn current_state(&self) -> Option<(String, f32)> {
        self.host.as_ref().and_then(|h| h.current_state())
    }

    /// Сброс кэша bool'ов: следующий push уйдёт в аниматор безусловно
    pub fn invalidate_cache(&mut self) {
        self.last_bools = [None; 4];
    }
}

//! Secondary-effect command interpreter
//!
//! Effect blocks are small command lists attached to action outcomes
//! (transformations, switch flips, extra animations). The driver runs the
//! interpreter one step per tick. Failures never unwind into the battle
//! loop: a failing command is skipped, a failing sub-block is discarded.

use crate::battler::BattlerRef;
use crate::defs::ContentDefs;
use crate::gate::SharedState;
use crate::host::Stage;
use crate::id::{AnimationId, EffectId, EnemyId, StateId};
use crate::session::BattleSession;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors a script command can raise
///
/// These are expected mid-battle (effects may reference state that no
/// longer exists) and are always logged at debug level, never surfaced.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Unknown effect block: {0}")]
    UnknownEffect(EffectId),

    #[error("Unknown enemy template: {0}")]
    UnknownEnemy(EnemyId),

    #[error("Stale battler reference: {0}")]
    StaleTarget(BattlerRef),

    #[error("Stale troop index: {0}")]
    StaleTroopIndex(usize),

    #[error("Division by zero")]
    DivisionByZero,
}

/// Arithmetic applied to a variable by [`ScriptCommand::ChangeVariable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarOp {
    /// Set to the value
    Set,
    /// Add the value
    Add,
    /// Subtract the value
    Sub,
    /// Multiply by the value
    Mul,
    /// Divide by the value
    Div,
}

impl VarOp {
    /// Apply this operation to a current value
    pub fn apply(&self, current: i32, operand: i32) -> Result<i32, ScriptError> {
        match self {
            VarOp::Set => Ok(operand),
            VarOp::Add => Ok(current.saturating_add(operand)),
            VarOp::Sub => Ok(current.saturating_sub(operand)),
            VarOp::Mul => Ok(current.saturating_mul(operand)),
            VarOp::Div => {
                if operand == 0 {
                    Err(ScriptError::DivisionByZero)
                } else {
                    Ok(current / operand)
                }
            }
        }
    }
}

/// One command inside an effect block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCommand {
    // === Shared state ===
    /// Flip a switch
    SetSwitch { id: u32, value: bool },
    /// Arithmetic on a variable
    ChangeVariable { id: u32, op: VarOp, value: i32 },

    // === Battlefield ===
    /// Swap a troop member onto another template
    TransformEnemy { index: usize, enemy: EnemyId },
    /// Attach a status state to a battler
    AddState { target: BattlerRef, state: StateId },
    /// Detach a status state from a battler
    RemoveState { target: BattlerRef, state: StateId },

    // === Presentation ===
    /// Play an animation on a battler
    PlayAnimation {
        target: BattlerRef,
        animation: AnimationId,
    },
    /// Show a battle-log line
    ShowText { text: String },

    // === Control ===
    /// Pause this block for a number of ticks
    Wait { ticks: u32 },
    /// Run another effect block as a sub-block
    Run { effect: EffectId },
}

/// What executing one command asks the interpreter to do next
enum Step {
    /// Move on to the next command within the same tick
    Continue,
    /// Yield and stay paused for this many ticks
    Wait(u32),
    /// Yield into a sub-block
    Enter(EffectId),
}

/// Everything commands are allowed to touch while executing
pub struct ScriptCtx<'a> {
    /// Gated switches and variables
    pub shared: &'a mut SharedState,
    /// Current roster
    pub session: &'a mut BattleSession,
    /// Presentation surface
    pub stage: &'a mut dyn Stage,
    /// Definition registry for template and block lookups
    pub defs: &'a ContentDefs,
}

/// Runs one effect block, one step per tick, with nested sub-blocks
#[derive(Debug)]
pub struct Interpreter {
    /// Block being executed, for logs
    effect: EffectId,
    commands: Vec<ScriptCommand>,
    index: usize,
    wait: u32,
    child: Option<Box<Interpreter>>,
}

impl Interpreter {
    /// Start an interpreter over a command list
    pub fn new(effect: EffectId, commands: Vec<ScriptCommand>) -> Self {
        Self {
            effect,
            commands,
            index: 0,
            wait: 0,
            child: None,
        }
    }

    /// Which effect block this interpreter is running
    pub fn effect(&self) -> EffectId {
        self.effect
    }

    /// True while any command, wait, or sub-block remains
    pub fn is_running(&self) -> bool {
        self.wait > 0 || self.child.is_some() || self.index < self.commands.len()
    }

    /// Drive one step, applying the skip rule to failures
    ///
    /// A failing command in this block is skipped and logged; sub-block
    /// failures are handled inside [`advance_once`] by discarding the
    /// sub-block so this block resumes.
    pub fn tick(&mut self, ctx: &mut ScriptCtx<'_>) {
        if let Err(e) = self.advance_once(ctx) {
            debug!(effect = %self.effect, error = %e, "effect command failed, skipping");
            self.index += 1;
        }
    }

    /// One step of this block; own-command errors propagate to the caller
    /// with `index` still pointing at the failing command
    fn advance_once(&mut self, ctx: &mut ScriptCtx<'_>) -> Result<(), ScriptError> {
        if self.wait > 0 {
            self.wait -= 1;
            return Ok(());
        }

        if let Some(mut child) = self.child.take() {
            match child.advance_once(ctx) {
                Err(e) => {
                    debug!(
                        effect = %child.effect,
                        error = %e,
                        "effect sub-block failed, discarding"
                    );
                }
                Ok(()) => {
                    if child.is_running() {
                        self.child = Some(child);
                    }
                }
            }
            return Ok(());
        }

        loop {
            let command = match self.commands.get(self.index) {
                Some(c) => c.clone(),
                None => return Ok(()),
            };
            match self.exec(&command, ctx)? {
                Step::Continue => self.index += 1,
                Step::Wait(ticks) => {
                    self.index += 1;
                    self.wait = ticks;
                    return Ok(());
                }
                Step::Enter(effect) => {
                    let def = ctx
                        .defs
                        .effect(effect)
                        .ok_or(ScriptError::UnknownEffect(effect))?;
                    self.index += 1;
                    self.child = Some(Box::new(Interpreter::new(effect, def.commands.clone())));
                    return Ok(());
                }
            }
        }
    }

    fn exec(&self, command: &ScriptCommand, ctx: &mut ScriptCtx<'_>) -> Result<Step, ScriptError> {
        match command {
            ScriptCommand::SetSwitch { id, value } => {
                ctx.shared.set_switch(*id, *value);
                Ok(Step::Continue)
            }
            ScriptCommand::ChangeVariable { id, op, value } => {
                let current = ctx.shared.variable(*id);
                let next = op.apply(current, *value)?;
                ctx.shared.set_variable(*id, next);
                Ok(Step::Continue)
            }
            ScriptCommand::TransformEnemy { index, enemy } => {
                let def = ctx
                    .defs
                    .enemy(*enemy)
                    .ok_or(ScriptError::UnknownEnemy(*enemy))?;
                let name = def.name.clone();
                let animation = def.attack_animation;
                let member = ctx
                    .session
                    .troop_member_mut(*index)
                    .ok_or(ScriptError::StaleTroopIndex(*index))?;
                member.retemplate(*enemy, name, animation);
                let slot = member.slot;
                let shown = member.name.clone();
                ctx.stage.place_enemy(*index, &shown, slot);
                Ok(Step::Continue)
            }
            ScriptCommand::AddState { target, state } => {
                if !ctx.session.add_state(*target, *state) {
                    return Err(ScriptError::StaleTarget(*target));
                }
                Ok(Step::Continue)
            }
            ScriptCommand::RemoveState { target, state } => {
                if !ctx.session.remove_state(*target, *state) {
                    return Err(ScriptError::StaleTarget(*target));
                }
                Ok(Step::Continue)
            }
            ScriptCommand::PlayAnimation { target, animation } => {
                if ctx.session.combatant(*target).is_none() {
                    return Err(ScriptError::StaleTarget(*target));
                }
                ctx.stage.play_animation(*target, *animation);
                Ok(Step::Continue)
            }
            ScriptCommand::ShowText { text } => {
                ctx.stage.show_message(text);
                Ok(Step::Continue)
            }
            ScriptCommand::Wait { ticks } => Ok(Step::Wait(*ticks)),
            ScriptCommand::Run { effect } => Ok(Step::Enter(*effect)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::{PartyMember, TroopMember, Vitals};
    use crate::defs::{ContentDefs, EffectDef, EnemyDef};
    use crate::host::Backdrop;

    struct NullStage {
        animations: Vec<(BattlerRef, AnimationId)>,
        messages: Vec<String>,
        placed: Vec<(usize, String)>,
    }

    impl NullStage {
        fn new() -> Self {
            Self {
                animations: Vec::new(),
                messages: Vec::new(),
                placed: Vec::new(),
            }
        }
    }

    impl Stage for NullStage {
        fn set_backdrop(&mut self, _backdrop: Backdrop) {}
        fn place_enemy(&mut self, index: usize, name: &str, _slot: (i32, i32)) {
            self.placed.push((index, name.to_string()));
        }
        fn play_animation(&mut self, target: BattlerRef, animation: AnimationId) {
            self.animations.push((target, animation));
        }
        fn flash(&mut self, _subject: BattlerRef) {}
        fn animation_playing(&self) -> bool {
            false
        }
        fn show_damage(&mut self, _target: BattlerRef, _damage: i32, _critical: bool) {}
        fn show_miss(&mut self, _target: BattlerRef) {}
        fn show_message(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }
        fn play_collapse(&mut self, _target: BattlerRef) {}
        fn end_action(&mut self, _subject: BattlerRef) {}
    }

    fn session() -> BattleSession {
        BattleSession::new(
            vec![PartyMember::new(0, "Alia", Vitals::full(100, 20))],
            vec![TroopMember::new(
                0,
                EnemyId::new(3),
                "Slime",
                Vitals::full(30, 0),
            )],
        )
    }

    fn defs_with_effect(id: u32, commands: Vec<ScriptCommand>) -> ContentDefs {
        let mut defs = ContentDefs::new();
        defs.effects.insert(
            EffectId::new(id),
            EffectDef {
                id: EffectId::new(id),
                name: String::new(),
                commands,
            },
        );
        defs
    }

    fn run_to_end(
        interp: &mut Interpreter,
        shared: &mut SharedState,
        session: &mut BattleSession,
        stage: &mut NullStage,
        defs: &ContentDefs,
    ) {
        for _ in 0..1000 {
            if !interp.is_running() {
                return;
            }
            let mut ctx = ScriptCtx {
                shared,
                session,
                stage,
                defs,
            };
            interp.tick(&mut ctx);
        }
        panic!("interpreter did not finish");
    }

    #[test]
    fn test_switch_and_variable_commands() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let defs = ContentDefs::new();
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![
                ScriptCommand::SetSwitch { id: 2, value: true },
                ScriptCommand::ChangeVariable {
                    id: 5,
                    op: VarOp::Set,
                    value: 10,
                },
                ScriptCommand::ChangeVariable {
                    id: 5,
                    op: VarOp::Add,
                    value: 7,
                },
            ],
        );
        run_to_end(&mut interp, &mut shared, &mut session, &mut stage, &defs);
        assert!(shared.switch(2));
        assert_eq!(shared.variable(5), 17);
    }

    #[test]
    fn test_wait_pauses_block() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let defs = ContentDefs::new();
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![
                ScriptCommand::Wait { ticks: 2 },
                ScriptCommand::SetSwitch { id: 1, value: true },
            ],
        );

        let mut ctx = ScriptCtx {
            shared: &mut shared,
            session: &mut session,
            stage: &mut stage,
            defs: &defs,
        };
        interp.tick(&mut ctx);
        assert!(interp.is_running());
        drop(ctx);
        assert!(!shared.switch(1));

        let mut ctx = ScriptCtx {
            shared: &mut shared,
            session: &mut session,
            stage: &mut stage,
            defs: &defs,
        };
        interp.tick(&mut ctx);
        interp.tick(&mut ctx);
        interp.tick(&mut ctx);
        drop(ctx);
        assert!(!interp.is_running());
        assert!(shared.switch(1));
    }

    #[test]
    fn test_failing_command_is_skipped() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let defs = ContentDefs::new();
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![
                ScriptCommand::ChangeVariable {
                    id: 1,
                    op: VarOp::Div,
                    value: 0,
                },
                ScriptCommand::SetSwitch { id: 9, value: true },
            ],
        );
        run_to_end(&mut interp, &mut shared, &mut session, &mut stage, &defs);
        assert!(shared.switch(9));
    }

    #[test]
    fn test_failing_sub_block_is_discarded() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let defs = defs_with_effect(
            2,
            vec![
                ScriptCommand::AddState {
                    target: BattlerRef::troop(7),
                    state: StateId::new(1),
                },
                ScriptCommand::SetSwitch {
                    id: 50,
                    value: true,
                },
            ],
        );
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![
                ScriptCommand::Run {
                    effect: EffectId::new(2),
                },
                ScriptCommand::SetSwitch {
                    id: 60,
                    value: true,
                },
            ],
        );
        run_to_end(&mut interp, &mut shared, &mut session, &mut stage, &defs);
        // The sub-block died on its first command; the rest of it never ran.
        assert!(!shared.switch(50));
        assert!(shared.switch(60));
    }

    #[test]
    fn test_transform_swaps_template() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let mut defs = ContentDefs::new();
        defs.enemies.insert(
            EnemyId::new(9),
            EnemyDef {
                id: EnemyId::new(9),
                name: "King Slime".into(),
                attack_animation: AnimationId::new(12),
            },
        );
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![ScriptCommand::TransformEnemy {
                index: 0,
                enemy: EnemyId::new(9),
            }],
        );
        run_to_end(&mut interp, &mut shared, &mut session, &mut stage, &defs);
        assert_eq!(session.troop[0].name, "King Slime");
        assert_eq!(session.troop[0].enemy, EnemyId::new(9));
        assert_eq!(stage.placed, vec![(0, "King Slime".to_string())]);
        // Vitals stay server-owned across a transform.
        assert_eq!(session.troop[0].vitals.hp, 30);
    }

    #[test]
    fn test_unknown_run_target_skipped() {
        let mut shared = SharedState::new();
        let mut session = session();
        let mut stage = NullStage::new();
        let defs = ContentDefs::new();
        let mut interp = Interpreter::new(
            EffectId::new(1),
            vec![
                ScriptCommand::Run {
                    effect: EffectId::new(99),
                },
                ScriptCommand::SetSwitch { id: 3, value: true },
            ],
        );
        run_to_end(&mut interp, &mut shared, &mut session, &mut stage, &defs);
        assert!(shared.switch(3));
    }
}
